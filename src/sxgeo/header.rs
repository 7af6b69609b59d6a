//! Database header decoding.
//!
//! Every SxGeo file opens with a fixed 40-byte header, all multi-byte
//! fields big-endian:
//!
//! ```text
//! [3 bytes] "SxG" signature
//! [1 byte ] version (22 for v2.2)
//! [4 bytes] creation timestamp (Unix epoch)
//! [1 byte ] database type
//! [1 byte ] charset (0 utf-8, 1 latin1, 2 cp1251)
//! [1 byte ] first-octet index entries
//! [2 bytes] main index entries
//! [2 bytes] blocks per main-index slot
//! [4 bytes] total IP range blocks
//! [1 byte ] payload id width (1..=4)
//! [2+2 bytes] max region / city record sizes
//! [4+4 bytes] regions / cities section sizes
//! [2 bytes] max country record size
//! [4 bytes] country section size (0 in v2.2, folded into cities)
//! [2 bytes] pack-format blob size
//! ```

use byteorder::{BigEndian, ByteOrder};

use super::error::{GeoError, Result};

/// Magic bytes at the start of every SxGeo database.
const SIGNATURE: &[u8; 3] = b"SxG";

/// Fixed length of the header block.
pub(crate) const HEADER_LEN: usize = 40;

/// Bytes of IP prefix before the payload id inside a DB block.
pub(crate) const BLOCK_PREFIX_LEN: u32 = 3;

/// Parsed database header.
#[derive(Debug, Clone)]
pub(crate) struct Header {
    pub version: u8,
    pub timestamp: u32,
    pub db_type: u8,
    pub charset: u8,
    pub byte_index_len: u8,
    pub main_index_len: u16,
    pub range_blocks: u16,
    pub db_items: u32,
    pub id_len: u8,
    pub max_region: u16,
    pub max_city: u16,
    pub region_size: u32,
    pub city_size: u32,
    pub max_country: u16,
    pub country_size: u32,
    pub pack_size: u16,
}

impl Header {
    /// Size in bytes of one DB block: the 3-byte IP prefix plus the
    /// payload id.
    pub fn block_size(&self) -> u32 {
        BLOCK_PREFIX_LEN + u32::from(self.id_len)
    }
}

/// Decodes and validates the 40-byte header block.
pub(crate) fn parse(data: &[u8]) -> Result<Header> {
    if data.len() < HEADER_LEN {
        return Err(GeoError::Format(format!(
            "header too short: {} bytes, need {HEADER_LEN}",
            data.len()
        )));
    }
    if &data[0..3] != SIGNATURE {
        return Err(GeoError::Format("missing SxG signature".into()));
    }

    let header = Header {
        version: data[3],
        timestamp: BigEndian::read_u32(&data[4..8]),
        db_type: data[8],
        charset: data[9],
        byte_index_len: data[10],
        main_index_len: BigEndian::read_u16(&data[11..13]),
        range_blocks: BigEndian::read_u16(&data[13..15]),
        db_items: BigEndian::read_u32(&data[15..19]),
        id_len: data[19],
        max_region: BigEndian::read_u16(&data[20..22]),
        max_city: BigEndian::read_u16(&data[22..24]),
        region_size: BigEndian::read_u32(&data[24..28]),
        city_size: BigEndian::read_u32(&data[28..32]),
        max_country: BigEndian::read_u16(&data[32..34]),
        country_size: BigEndian::read_u32(&data[34..38]),
        pack_size: BigEndian::read_u16(&data[38..40]),
    };

    if header.byte_index_len == 0
        || header.main_index_len == 0
        || header.range_blocks == 0
        || header.db_items == 0
    {
        return Err(GeoError::Format("critical header field is zero".into()));
    }
    if header.id_len == 0 || header.id_len > 4 {
        return Err(GeoError::Format(format!(
            "unsupported payload id width: {}",
            header.id_len
        )));
    }

    Ok(header)
}
