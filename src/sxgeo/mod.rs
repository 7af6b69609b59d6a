//! Core SxGeo reader module.

pub mod error;
pub mod models;

mod header;
mod index;
mod iso;
mod resolve;
mod search;
mod store;
mod unpack;
mod utils;

use std::fs::File;
use std::io::Read;
use std::ops::BitOr;
use std::path::Path;

use chrono::{TimeZone, Utc};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1251, WINDOWS_1252};
use log::{debug, info};

use error::{GeoError, Result};
use header::Header;
use index::Index;
use models::{About, GeoInfo, LocationInfo, SectionInfo};
use resolve::RecordKind;
use store::{Layout, Store};

pub use iso::country_iso;

/// How the reader accesses the database file.
///
/// Options combine with `|`; unknown bits are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode(u32);

impl Mode {
    /// Read the required parts of the file on every lookup. Least
    /// memory, slowest lookups.
    pub const FILE: Mode = Mode(0);
    /// Load the db, regions and cities sections into owned buffers and
    /// close the file. Fastest lookups, freely shareable across
    /// threads. Implies pre-decoded indexes.
    pub const MEMORY: Mode = Mode(1);
    /// Pre-decode the indexes into `u32` arrays even when reading from
    /// disk.
    pub const BATCH: Mode = Mode(2);

    fn resident(self) -> bool {
        self.0 & Mode::MEMORY.0 != 0
    }

    fn decoded_indexes(self) -> bool {
        self.resident() || self.0 & Mode::BATCH.0 != 0
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

/// Pack-format strings in file order: country, region, city. Any entry
/// may be absent for country-only databases.
#[derive(Debug, Default)]
struct PackFormats(Vec<String>);

impl PackFormats {
    fn parse(blob: &[u8]) -> PackFormats {
        if blob.is_empty() {
            return PackFormats::default();
        }
        let text = String::from_utf8_lossy(blob);
        PackFormats(
            text.trim_end_matches('\0')
                .split('\0')
                .map(str::to_string)
                .collect(),
        )
    }

    fn get(&self, kind: RecordKind) -> Option<&str> {
        let at = match kind {
            RecordKind::Country => 0,
            RecordKind::Region => 1,
            RecordKind::City => 2,
        };
        self.0
            .get(at)
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }
}

/// A read-only Sypex Geo v2.2 database.
///
/// All state is built at open and never mutated by queries. Resident
/// engines are freely shareable across threads; on-disk engines issue
/// only positioned reads, so concurrent queries need nothing beyond a
/// read primitive that tolerates them.
#[derive(Debug)]
pub struct SxGeo {
    header: Header,
    formats: PackFormats,
    index: Index,
    store: Store,
    layout: Layout,
    block_size: u32,
    encoding: &'static Encoding,
}

impl SxGeo {
    /// Opens a database file.
    ///
    /// # Errors
    /// [`GeoError::Io`] when the file cannot be opened or read, and
    /// [`GeoError::Format`] when the header or pack formats do not form
    /// a valid v2.2 database.
    pub fn open(path: impl AsRef<Path>, mode: Mode) -> Result<Self> {
        let path = path.as_ref();
        info!("opening SxGeo database {}", path.display());
        let mut file = File::open(path)?;

        let mut head = [0u8; header::HEADER_LEN];
        file.read_exact(&mut head)?;
        let header = header::parse(&head)?;
        let block_size = header.block_size();

        let mut pack_blob = vec![0u8; usize::from(header.pack_size)];
        file.read_exact(&mut pack_blob)?;
        let formats = PackFormats::parse(&pack_blob);
        if header.max_city > 0 && formats.get(RecordKind::City).is_none() {
            return Err(GeoError::Format(
                "city database without a city pack format".into(),
            ));
        }

        let mut byte_raw = vec![0u8; usize::from(header.byte_index_len) * 4];
        file.read_exact(&mut byte_raw)?;
        let mut main_raw = vec![0u8; usize::from(header.main_index_len) * 4];
        file.read_exact(&mut main_raw)?;
        let index = Index::new(byte_raw, main_raw, mode.decoded_indexes());

        let db_begin = (header::HEADER_LEN
            + usize::from(header.pack_size)
            + usize::from(header.byte_index_len) * 4
            + usize::from(header.main_index_len) * 4) as u64;
        let db_size = u64::from(header.db_items) * u64::from(block_size);
        let layout = Layout {
            db_begin,
            regions_begin: db_begin + db_size,
            cities_begin: db_begin + db_size + u64::from(header.region_size),
        };
        debug!(
            "sections: db at {}, regions at {}, cities at {}, type {}, charset {}",
            layout.db_begin,
            layout.regions_begin,
            layout.cities_begin,
            db_type_name(header.db_type),
            charset_name(header.charset),
        );

        let store = if mode.resident() {
            // The cursor already sits at db_begin; the sections follow
            // back to back. The file closes when it drops here.
            let mut db = vec![0u8; db_size as usize];
            file.read_exact(&mut db)?;
            let mut regions = vec![0u8; header.region_size as usize];
            file.read_exact(&mut regions)?;
            let mut cities = vec![0u8; header.city_size as usize];
            file.read_exact(&mut cities)?;
            Store::Resident {
                db,
                regions,
                cities,
            }
        } else {
            Store::OnDisk {
                file: Some(file),
                layout,
            }
        };

        Ok(Self {
            encoding: charset_encoding(header.charset),
            header,
            formats,
            index,
            store,
            layout,
            block_size,
        })
    }

    /// Two-letter ISO 3166-1 code of the IP's country, or `""` when the
    /// address is reserved or not in the database.
    pub fn get_country_iso(&self, ip: &str) -> Result<String> {
        let id = self.get_country_id(ip)?;
        if id == 0 {
            return Ok(String::new());
        }
        Ok(iso::country_iso(id).to_string())
    }

    /// Numeric country id of the IP, or 0 when not found.
    ///
    /// City databases keep the id on the city record; country databases
    /// store it directly in the block payload.
    pub fn get_country_id(&self, ip: &str) -> Result<u32> {
        let found = self.find(ip)?;
        if found == 0 {
            return Ok(0);
        }
        if self.header.max_city > 0 {
            let rec = self.read_record(RecordKind::City, found)?;
            return Ok(u32::from(rec.get_u8("country_id")));
        }
        Ok(found)
    }

    /// City and country details, without the region.
    ///
    /// `None` for reserved or unknown addresses, and always `None` on a
    /// country-only database.
    pub fn get_city(&self, ip: &str) -> Result<Option<LocationInfo>> {
        self.city_lookup(ip, false)
    }

    /// City, region and country details.
    pub fn get_city_full(&self, ip: &str) -> Result<Option<LocationInfo>> {
        self.city_lookup(ip, true)
    }

    fn city_lookup(&self, ip: &str, want_full: bool) -> Result<Option<LocationInfo>> {
        if self.header.max_city == 0 {
            return Ok(None);
        }
        let seek = self.find(ip)?;
        if seek == 0 {
            return Ok(None);
        }
        Ok(Some(self.resolve_city(seek, want_full)?))
    }

    /// Type-dispatching lookup: the full aggregate for city databases,
    /// the country ISO code for country databases.
    pub fn get(&self, ip: &str) -> Result<Option<GeoInfo>> {
        if self.header.max_city > 0 {
            return Ok(self.get_city_full(ip)?.map(GeoInfo::City));
        }
        let iso = self.get_country_iso(ip)?;
        Ok((!iso.is_empty()).then(|| GeoInfo::Country(iso)))
    }

    /// Metadata about the opened database, straight from the header.
    pub fn about(&self) -> About {
        let created = Utc
            .timestamp_opt(i64::from(self.header.timestamp), 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_default();
        About {
            created,
            timestamp: self.header.timestamp,
            charset: charset_name(self.header.charset).to_string(),
            db_type: db_type_name(self.header.db_type).to_string(),
            version: self.header.version,
            byte_index_entries: self.header.byte_index_len,
            main_index_entries: self.header.main_index_len,
            range_blocks: self.header.range_blocks,
            db_items: self.header.db_items,
            id_len: self.header.id_len,
            block_size: self.block_size,
            pack_formats: self.formats.0.clone(),
            db_begin: self.layout.db_begin,
            regions_begin: self.layout.regions_begin,
            cities_begin: self.layout.cities_begin,
            city: SectionInfo {
                max_record_len: self.header.max_city,
                total_size: self.header.city_size,
            },
            region: SectionInfo {
                max_record_len: self.header.max_region,
                total_size: self.header.region_size,
            },
            country: SectionInfo {
                max_record_len: self.header.max_country,
                total_size: self.header.country_size,
            },
        }
    }

    /// Releases the on-disk file handle. Idempotent, and a no-op for
    /// resident engines. Later on-disk queries fail with
    /// [`GeoError::Closed`].
    pub fn close(&mut self) {
        self.store.close();
    }
}

fn charset_encoding(charset: u8) -> &'static Encoding {
    match charset {
        1 => WINDOWS_1252,
        2 => WINDOWS_1251,
        _ => UTF_8,
    }
}

fn charset_name(charset: u8) -> &'static str {
    match charset {
        0 => "utf-8",
        1 => "latin1",
        2 => "cp1251",
        _ => "unknown",
    }
}

fn db_type_name(db_type: u8) -> &'static str {
    match db_type {
        1 => "SxGeo Country",
        2 => "SxGeo City RU",
        3 => "SxGeo City EN",
        4 => "SxGeo City",
        5 => "SxGeo City Max RU",
        6 => "SxGeo City Max EN",
        7 => "SxGeo City Max",
        _ => "unknown",
    }
}
