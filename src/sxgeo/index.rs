//! The first-octet and main narrowing indexes.
//!
//! Both indexes are arrays of big-endian u32 entries. They are kept
//! either as the raw bytes read from the file or pre-decoded into `u32`
//! arrays; the two layouts answer identical queries, pre-decoding just
//! trades memory for less per-lookup work.

use byteorder::{BigEndian, ByteOrder};

#[derive(Debug)]
pub(crate) enum Index {
    Raw { byte: Vec<u8>, main: Vec<u8> },
    Decoded { byte: Vec<u32>, main: Vec<u32> },
}

impl Index {
    pub fn new(byte: Vec<u8>, main: Vec<u8>, decode: bool) -> Index {
        if decode {
            Index::Decoded {
                byte: decode_u32s(&byte),
                main: decode_u32s(&main),
            }
        } else {
            Index::Raw { byte, main }
        }
    }

    /// Cumulative block range for first octet `b`; the caller guarantees
    /// `1 <= b < byte_index_len`.
    pub fn byte_range(&self, b: u32) -> (u32, u32) {
        match self {
            Index::Raw { byte, .. } => (read_entry(byte, b - 1), read_entry(byte, b)),
            Index::Decoded { byte, .. } => (byte[(b - 1) as usize], byte[b as usize]),
        }
    }

    pub fn main_len(&self) -> u32 {
        match self {
            Index::Raw { main, .. } => (main.len() / 4) as u32,
            Index::Decoded { main, .. } => main.len() as u32,
        }
    }

    fn main_at(&self, i: u32) -> u32 {
        match self {
            Index::Raw { main, .. } => read_entry(main, i),
            Index::Decoded { main, .. } => main[i as usize],
        }
    }

    /// Lower-bound search over the main index: the smallest `p` in
    /// `[lo, hi]` with `main[p] >= ip`, or `lo` when the range is empty
    /// after clamping `hi` into the index.
    ///
    /// The bisection hands off to a linear tail once the window is down
    /// to eight entries; the tail is what fixes the equality semantics
    /// at group boundaries, so the threshold is part of the contract.
    pub fn partition(&self, ip: u32, lo: u32, hi: u32) -> u32 {
        let len = self.main_len();
        if len == 0 {
            return lo;
        }
        let top = hi.min(len - 1);
        if lo > top {
            return lo;
        }

        let (mut lo, mut hi) = (lo, top);
        while hi - lo > 8 {
            let mid = lo + (hi - lo) / 2;
            if ip > self.main_at(mid) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        while lo <= top && ip > self.main_at(lo) {
            lo += 1;
        }
        lo
    }
}

fn decode_u32s(raw: &[u8]) -> Vec<u32> {
    raw.chunks_exact(4).map(BigEndian::read_u32).collect()
}

fn read_entry(raw: &[u8], i: u32) -> u32 {
    let at = i as usize * 4;
    BigEndian::read_u32(&raw[at..at + 4])
}
