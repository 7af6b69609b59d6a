//! Assembling City, Region and Country records from a city seek.

use log::debug;

use super::error::{GeoError, Result};
use super::iso::country_iso;
use super::models::{City, Country, LocationInfo, Region};
use super::store::Section;
use super::unpack::{unpack, Record};
use super::SxGeo;

/// The three record kinds, in pack-format order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordKind {
    Country,
    Region,
    City,
}

impl SxGeo {
    /// Reads and unpacks one record of `kind` at `seek`.
    ///
    /// Yields an empty record when the kind's pack format or section is
    /// absent, which is how databases without regions stay queryable.
    /// In v2.2 country records live inside the cities section, so both
    /// kinds read from there.
    pub(crate) fn read_record(&self, kind: RecordKind, seek: u32) -> Result<Record> {
        let Some(format) = self.formats.get(kind) else {
            return Ok(Record::default());
        };
        let max_len = match kind {
            RecordKind::Country => self.header.max_country,
            RecordKind::Region => self.header.max_region,
            RecordKind::City => self.header.max_city,
        };
        if max_len == 0 {
            return Ok(Record::default());
        }
        let section = match kind {
            RecordKind::Region => Section::Regions,
            RecordKind::Country | RecordKind::City => Section::Cities,
        };
        let data = self
            .store
            .read(section, u64::from(seek), usize::from(max_len))?;
        unpack(format, &data, self.encoding)
    }

    /// Builds the location aggregate for a city seek.
    ///
    /// A failed or impossible region read degrades to "no region"; the
    /// country likewise falls back to the id stored on the city record
    /// when no country record is reachable through the region.
    pub(crate) fn resolve_city(&self, seek: u32, want_full: bool) -> Result<LocationInfo> {
        if self.formats.get(RecordKind::City).is_none() {
            return Err(GeoError::MissingFormat("city"));
        }

        let city_rec = self.read_record(RecordKind::City, seek)?;
        if city_rec.is_empty() {
            return Err(GeoError::Format(format!("no city record at offset {seek}")));
        }
        let city = City {
            id: city_rec.get_u32("id"),
            lat: city_rec.get_f64("lat"),
            lon: city_rec.get_f64("lon"),
            name_ru: city_rec.get_str("name_ru").to_string(),
            name_en: city_rec.get_str("name_en").to_string(),
            region_seek: city_rec.get_u32("region_seek"),
            country_id: city_rec.get_u8("country_id"),
        };

        let mut region = None;
        if want_full && city.region_seek > 0 && self.header.max_region > 0 {
            match self.read_record(RecordKind::Region, city.region_seek) {
                Ok(rec) if !rec.is_empty() => {
                    region = Some(Region {
                        id: rec.get_u32("id"),
                        name_ru: rec.get_str("name_ru").to_string(),
                        name_en: rec.get_str("name_en").to_string(),
                        iso: rec.get_str("iso").to_string(),
                        country_seek: rec.get_u32("country_seek"),
                    });
                }
                Ok(_) => {}
                Err(e) => debug!("region read at {} skipped: {e}", city.region_seek),
            }
        }

        let country_seek = region.as_ref().map_or(0, |r| r.country_seek);
        let mut country_id = city.country_id;
        let mut country_rec = Record::default();
        if country_seek > 0 && self.header.max_country > 0 {
            match self.read_record(RecordKind::Country, country_seek) {
                Ok(rec) => {
                    // The record's own id wins over the city fallback,
                    // but only when the format actually carries one.
                    if rec.contains("id") {
                        country_id = rec.get_u8("id");
                    }
                    country_rec = rec;
                }
                Err(e) => debug!("country read at {country_seek} skipped: {e}"),
            }
        }

        let country = (country_id > 0).then(|| Country {
            id: country_id,
            iso: country_iso(u32::from(country_id)).to_string(),
            lat: country_rec.get_f64("lat"),
            lon: country_rec.get_f64("lon"),
            name_ru: country_rec.get_str("name_ru").to_string(),
            name_en: country_rec.get_str("name_en").to_string(),
        });

        Ok(LocationInfo {
            city: Some(city),
            region,
            country,
        })
    }
}
