//! The IPv4 to block payload lookup path.
//!
//! Narrowing happens in three stages: the first-octet bucket from the
//! byte index, an optional main-index partition when the bucket spans
//! more than one block group, and a bounded binary search over the
//! fixed-size blocks of the resulting window. A payload of 0 doubles as
//! "not found" throughout.

use log::trace;

use super::error::{GeoError, Result};
use super::header::BLOCK_PREFIX_LEN;
use super::store::Section;
use super::utils::{decode_payload, parse_ipv4};
use super::SxGeo;

/// First octets that never appear in the database.
fn reserved(octet: u32) -> bool {
    matches!(octet, 0 | 10 | 127)
}

impl SxGeo {
    /// Resolves an IP string to its block payload: a country id for
    /// country databases, a cities-section seek for city databases.
    /// Reserved and unindexed addresses resolve to 0.
    pub(crate) fn find(&self, ip: &str) -> Result<u32> {
        let ipn = parse_ipv4(ip).ok_or_else(|| GeoError::InvalidIp(ip.to_string()))?;
        self.find_num(ipn)
    }

    fn find_num(&self, ip: u32) -> Result<u32> {
        let octet = ip >> 24;
        if reserved(octet) || octet >= u32::from(self.header.byte_index_len) {
            return Ok(0);
        }

        let (min_block, max_block) = self.index.byte_range(octet);
        if max_block <= min_block {
            // Nothing indexed under this first octet.
            return Ok(0);
        }

        let range_blocks = u32::from(self.header.range_blocks);
        let db_items = self.header.db_items;

        let (search_min, search_max) = if max_block - min_block > range_blocks {
            let m_lo = min_block / range_blocks;
            let m_hi = ((max_block - 1) / range_blocks).max(m_lo);
            let part = self.index.partition(ip, m_lo, m_hi);

            let lo = if part == 0 {
                min_block
            } else {
                part * range_blocks
            };
            let hi = if part >= u32::from(self.header.main_index_len) {
                db_items
            } else {
                (part + 1) * range_blocks
            };
            (lo.max(min_block), hi.min(max_block).min(db_items))
        } else {
            (min_block, max_block.min(db_items))
        };
        trace!("block window [{search_min}, {search_max}) for {ip:#010x}");

        if search_min >= search_max {
            // The window collapsed; the covering block, if any, is the
            // one just before it.
            return if search_min == 0 {
                Ok(0)
            } else {
                self.block_payload(search_min.min(db_items) - 1)
            };
        }

        let block_size = self.block_size;
        let window = self.store.read(
            Section::Db,
            u64::from(search_min) * u64::from(block_size),
            (search_max - search_min) as usize * block_size as usize,
        )?;
        let blocks = (window.len() / block_size as usize) as u32;
        if blocks == 0 {
            // End-of-file truncation gets the collapsed-window treatment.
            return if search_min == 0 {
                Ok(0)
            } else {
                self.block_payload(search_min - 1)
            };
        }

        let suffix = [(ip >> 16) as u8, (ip >> 8) as u8, ip as u8];
        Ok(search_window(&window, blocks, block_size, suffix))
    }

    /// Payload id of a single block, read straight from the db section.
    fn block_payload(&self, block: u32) -> Result<u32> {
        let offset =
            u64::from(block) * u64::from(self.block_size) + u64::from(BLOCK_PREFIX_LEN);
        let id = self
            .store
            .read(Section::Db, offset, usize::from(self.header.id_len))?;
        if id.len() < usize::from(self.header.id_len) {
            return Ok(0);
        }
        Ok(decode_payload(&id))
    }
}

/// Binary search over a window of consecutive blocks, comparing the
/// three-octet IP suffix against each block's prefix bytes.
///
/// Returns the payload of the covering block, or 0 when the suffix
/// precedes the entire window. The bisection stops once eight blocks
/// remain and a linear tail settles ties: a suffix equal to a block's
/// prefix maps to that block.
fn search_window(window: &[u8], blocks: u32, block_size: u32, suffix: [u8; 3]) -> u32 {
    let prefix = |i: u32| -> &[u8] {
        let at = i as usize * block_size as usize;
        &window[at..at + BLOCK_PREFIX_LEN as usize]
    };

    let (mut lo, mut hi) = (0u32, blocks);
    while hi - lo > 8 {
        let mid = lo + (hi - lo) / 2;
        if suffix.as_slice() > prefix(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    while lo < blocks && prefix(lo) <= suffix.as_slice() {
        lo += 1;
    }
    if lo == 0 {
        return 0;
    }

    let at = (lo - 1) as usize * block_size as usize + BLOCK_PREFIX_LEN as usize;
    decode_payload(&window[at..at + (block_size - BLOCK_PREFIX_LEN) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(entries: &[(u32, u8)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (suffix, id) in entries {
            out.extend_from_slice(&suffix.to_be_bytes()[1..]);
            out.push(*id);
        }
        out
    }

    #[test]
    fn covering_block_is_the_last_one_not_above() {
        let data = window(&[(0x000100, 1), (0x000200, 2), (0x000300, 3)]);
        assert_eq!(search_window(&data, 3, 4, [0, 1, 0x80]), 1);
        assert_eq!(search_window(&data, 3, 4, [0, 2, 0]), 2);
        assert_eq!(search_window(&data, 3, 4, [0xff, 0, 0]), 3);
    }

    #[test]
    fn suffix_before_the_window_is_not_found() {
        let data = window(&[(0x000100, 1), (0x000200, 2)]);
        assert_eq!(search_window(&data, 2, 4, [0, 0, 0x42]), 0);
    }

    #[test]
    fn bisection_and_tail_agree_over_a_wide_window() {
        let entries: Vec<(u32, u8)> = (0..40).map(|i| (i * 0x40, (i + 1) as u8)).collect();
        let data = window(&entries);
        for (i, (suffix, id)) in entries.iter().enumerate() {
            let probe = suffix.to_be_bytes();
            let probe = [probe[1], probe[2], probe[3]];
            assert_eq!(
                search_window(&data, 40, 4, probe),
                u32::from(*id),
                "block {i} boundary"
            );
        }
    }
}
