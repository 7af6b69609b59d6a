//! Error types for the sxgeo-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// "Not found" is never an error: reserved ranges and addresses outside
/// the database surface as `None`, an empty string or a zero id from the
/// query methods.
#[derive(Debug, Error)]
pub enum GeoError {
    /// An error originating from I/O operations at open time.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A positioned read against one of the database sections failed.
    #[error("read failed in {section} section at offset {offset}: {source}")]
    Read {
        section: &'static str,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// The queried address does not parse as IPv4.
    #[error("invalid IPv4 address: {0:?}")]
    InvalidIp(String),

    /// The file is structurally invalid or does not conform to SxGeo v2.2.
    #[error("invalid database: {0}")]
    Format(String),

    /// A pack format required for the queried operation is absent.
    #[error("database lacks the {0} pack format")]
    MissingFormat(&'static str),

    /// The on-disk handle was released by a prior `close`.
    #[error("database file is closed")]
    Closed,
}

/// A convenience `Result` type alias using the crate's `GeoError` type.
pub type Result<T> = std::result::Result<T, GeoError>;
