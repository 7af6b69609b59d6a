//! Public result records and database metadata.
//!
//! Field names are part of the serialisation contract: callers that
//! emit JSON rely on the `id`, `iso`, `lat`, `lon`, `name_ru` and
//! `name_en` keys. Seek pointers carried between lookup stages are
//! crate-internal and never serialised.

use serde::Serialize;

/// Combined geolocation information for one IPv4 address.
///
/// Fields are `None` when the database lacks the data or the lookup was
/// not asked for it; `get_city` never fills `region`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<City>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
}

/// City attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct City {
    pub id: u32,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_ru: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_en: String,

    /// Offset of the owning region record, kept for full lookups.
    #[serde(skip)]
    pub(crate) region_seek: u32,
    /// Country id stored directly on the city record, the fallback when
    /// no country record is reachable.
    #[serde(skip)]
    pub(crate) country_id: u8,
}

/// Region attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Region {
    pub id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_ru: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_en: String,
    /// ISO 3166-2 code, e.g. "RU-MOW".
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iso: String,

    #[serde(skip)]
    pub(crate) country_seek: u32,
}

/// Country attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Country {
    pub id: u8,
    /// ISO 3166-1 alpha-2 code, e.g. "RU".
    pub iso: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_ru: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_en: String,
}

/// Result of a type-dispatching `get`: city databases yield the full
/// aggregate, country databases a bare ISO code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoInfo {
    City(LocationInfo),
    Country(String),
}

/// Per-section record limits reported by `SxGeo::about`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    pub max_record_len: u16,
    pub total_size: u32,
}

/// Database metadata reported by `SxGeo::about`, a direct dump of the
/// header plus the section layout derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct About {
    pub created: String,
    pub timestamp: u32,
    pub charset: String,
    pub db_type: String,
    pub version: u8,
    pub byte_index_entries: u8,
    pub main_index_entries: u16,
    pub range_blocks: u16,
    pub db_items: u32,
    pub id_len: u8,
    pub block_size: u32,
    pub pack_formats: Vec<String>,
    pub db_begin: u64,
    pub regions_begin: u64,
    pub cities_begin: u64,
    pub city: SectionInfo,
    pub region: SectionInfo,
    pub country: SectionInfo,
}
