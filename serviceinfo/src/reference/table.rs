//! Table-backed reference data.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::ReferenceData;
use super::error::ReferenceError;

/// On-disk layout of a reference data file.
///
/// ```json
/// {
///   "transport_modes": { "IC": "Intercity", "SPR": "Sprinter" },
///   "stations": { "ut": "Utrecht Centraal" }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
struct ReferenceFile {
    #[serde(default)]
    transport_modes: HashMap<String, String>,
    #[serde(default)]
    stations: HashMap<String, String>,
}

/// In-memory reference tables.
///
/// Station codes are stored lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceData {
    transport_modes: HashMap<String, String>,
    stations: HashMap<String, String>,
}

impl StaticReferenceData {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tables from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReferenceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load tables from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ReferenceError> {
        let file: ReferenceFile = serde_json::from_str(json).map_err(|e| ReferenceError::Json {
            message: e.to_string(),
        })?;

        let mut data = Self::new();
        for (code, description) in file.transport_modes {
            data.insert_transport_mode(code, description);
        }
        for (code, name) in file.stations {
            data.insert_station(&code, name);
        }
        Ok(data)
    }

    /// Add or replace a transport-mode description.
    pub fn insert_transport_mode(&mut self, code: impl Into<String>, description: impl Into<String>) {
        self.transport_modes.insert(code.into(), description.into());
    }

    /// Add or replace a station name.
    pub fn insert_station(&mut self, code: &str, name: impl Into<String>) {
        self.stations.insert(code.to_lowercase(), name.into());
    }

    /// Builder form of [`insert_transport_mode`](Self::insert_transport_mode).
    pub fn with_transport_mode(mut self, code: &str, description: &str) -> Self {
        self.insert_transport_mode(code, description);
        self
    }

    /// Builder form of [`insert_station`](Self::insert_station).
    pub fn with_station(mut self, code: &str, name: &str) -> Self {
        self.insert_station(code, name);
        self
    }

    /// Number of known stations.
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}

impl ReferenceData for StaticReferenceData {
    fn transport_mode(&self, code: &str) -> Result<String, ReferenceError> {
        self.transport_modes
            .get(code)
            .cloned()
            .ok_or_else(|| ReferenceError::UnknownTransportMode(code.to_string()))
    }

    fn station_name(&self, stop_code: &str) -> Result<String, ReferenceError> {
        self.stations
            .get(&stop_code.to_lowercase())
            .cloned()
            .ok_or_else(|| ReferenceError::UnknownStation(stop_code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "transport_modes": { "IC": "Intercity", "SPR": "Sprinter" },
        "stations": { "UT": "Utrecht Centraal", "asd": "Amsterdam Centraal" }
    }"#;

    #[test]
    fn lookups_from_json() {
        let data = StaticReferenceData::from_json(SAMPLE).unwrap();
        assert_eq!(data.transport_mode("IC").unwrap(), "Intercity");
        assert_eq!(data.station_name("ut").unwrap(), "Utrecht Centraal");
        assert_eq!(data.station_name("ASD").unwrap(), "Amsterdam Centraal");
        assert_eq!(data.station_count(), 2);
    }

    #[test]
    fn missing_mapping_is_an_error() {
        let data = StaticReferenceData::from_json(SAMPLE).unwrap();
        assert!(matches!(
            data.transport_mode("ic"),
            Err(ReferenceError::UnknownTransportMode(code)) if code == "ic"
        ));
        assert!(matches!(
            data.station_name("gvc"),
            Err(ReferenceError::UnknownStation(code)) if code == "gvc"
        ));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let data = StaticReferenceData::from_json("{}").unwrap();
        assert_eq!(data.station_count(), 0);
    }

    #[test]
    fn invalid_json_rejected() {
        let err = StaticReferenceData::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reference.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let data = StaticReferenceData::from_file(&path).unwrap();
        assert_eq!(data.transport_mode("SPR").unwrap(), "Sprinter");
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = StaticReferenceData::from_file("/nonexistent/reference.json");
        assert!(matches!(result, Err(ReferenceError::Io(_))));
    }

    #[test]
    fn builder_methods() {
        let data = StaticReferenceData::new()
            .with_transport_mode("IC", "Intercity")
            .with_station("Ehv", "Eindhoven");
        assert_eq!(data.transport_mode("IC").unwrap(), "Intercity");
        assert_eq!(data.station_name("EHV").unwrap(), "Eindhoven");
    }
}
