//! Read-only query engine for Sypex Geo (SxGeo) v2.2 binary databases.
//!
//! Given a dotted-decimal IPv4 address, the engine resolves city, region
//! and country attributes, or a bare country ISO code for country-only
//! databases. Lookups walk the file's two-level index (a first-octet
//! index plus a coarse main index) into a binary search over fixed-size
//! IP range blocks, then unpack the variable-width record the winning
//! block points at.
//!
//! Two access modes are supported: on-disk, where every lookup issues
//! positioned reads against the open file, and resident, where the data
//! sections are loaded into owned buffers at open and the file is closed.
//!
//! ```no_run
//! use sxgeo_reader::{Mode, SxGeo};
//!
//! # fn main() -> sxgeo_reader::Result<()> {
//! let db = SxGeo::open("SxGeoCity.dat", Mode::MEMORY)?;
//! if let Some(info) = db.get_city_full("93.158.134.3")? {
//!     println!("{:?}", info.country);
//! }
//! # Ok(())
//! # }
//! ```

pub mod sxgeo;

pub use sxgeo::error::{GeoError, Result};
pub use sxgeo::models::{About, City, Country, GeoInfo, LocationInfo, Region, SectionInfo};
pub use sxgeo::{Mode, SxGeo};
