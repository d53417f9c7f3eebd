//! Reference data lookup.
//!
//! Resolves transport-mode codes to descriptions and stop codes to human
//! station names. The parser consumes this through the [`ReferenceData`]
//! trait; [`StaticReferenceData`] is a table loaded from a JSON file.

mod error;
mod table;

pub use error::ReferenceError;
pub use table::StaticReferenceData;

/// Pure lookups against transport reference data.
///
/// A missing mapping is an error, not a default.
pub trait ReferenceData {
    /// Description for a transport-mode code (e.g. "IC" -> "Intercity").
    fn transport_mode(&self, code: &str) -> Result<String, ReferenceError>;

    /// Station name for a stop code. Codes are matched case-insensitively.
    fn station_name(&self, stop_code: &str) -> Result<String, ReferenceError>;
}

impl<T: ReferenceData + ?Sized> ReferenceData for &T {
    fn transport_mode(&self, code: &str) -> Result<String, ReferenceError> {
        (**self).transport_mode(code)
    }

    fn station_name(&self, stop_code: &str) -> Result<String, ReferenceError> {
        (**self).station_name(stop_code)
    }
}
