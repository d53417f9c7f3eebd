//! Service types.
//!
//! A `Service` is one physical run of a transport service on one calendar
//! date, with its stops in travel order. `ServiceSource` names the data
//! partition a record belongs to and `ReadMode` selects which partition a
//! lookup reads from.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::{InvalidSource, Stop};

/// Data partition of a service record: the planned timetable or live data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceSource {
    Scheduled,
    Actual,
}

impl ServiceSource {
    /// Returns the name used for this partition in store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceSource::Scheduled => "scheduled",
            ServiceSource::Actual => "actual",
        }
    }
}

impl fmt::Display for ServiceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceSource {
    type Err = InvalidSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scheduled" => Ok(ServiceSource::Scheduled),
            "actual" => Ok(ServiceSource::Actual),
            _ => Err(InvalidSource::new(s)),
        }
    }
}

/// Which partition a lookup reads from.
///
/// `Merged` reads `actual` and falls back wholesale to `scheduled` when the
/// actual partition has no record. Fields are never mixed across partitions.
///
/// # Examples
///
/// ```
/// use serviceinfo::domain::{ReadMode, ServiceSource};
///
/// assert_eq!("merged".parse::<ReadMode>().unwrap(), ReadMode::Merged);
/// assert_eq!(
///     "actual".parse::<ReadMode>().unwrap(),
///     ReadMode::Only(ServiceSource::Actual)
/// );
/// assert_eq!(ReadMode::default(), ReadMode::Merged);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadMode {
    #[default]
    Merged,
    Only(ServiceSource),
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadMode::Merged => f.write_str("merged"),
            ReadMode::Only(source) => source.fmt(f),
        }
    }
}

impl FromStr for ReadMode {
    type Err = InvalidSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("merged") {
            return Ok(ReadMode::Merged);
        }
        s.parse().map(ReadMode::Only)
    }
}

impl From<ServiceSource> for ReadMode {
    fn from(source: ServiceSource) -> Self {
        ReadMode::Only(source)
    }
}

/// One run of a transport service on one date.
///
/// `service_id` is unique per run; `service_number` is the public line/run
/// number and may be shared by several runs (e.g. combined trains).
/// `service_date` is fixed from the first stop when the record is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Opaque run identifier
    pub service_id: String,
    /// Public service number
    pub service_number: u32,
    /// Transport mode code (e.g. "IC")
    pub transport_mode: String,
    /// Resolved transport mode description (e.g. "Intercity")
    pub transport_mode_description: String,
    /// Calendar date of the run
    pub service_date: NaiveDate,
    /// Derived from the stops, see [`Service::derive_cancelled`]
    pub cancelled: bool,
    /// Operator code
    pub company_code: Option<String>,
    /// Operator name
    pub company_name: Option<String>,
    /// Stops in travel order
    pub stops: Vec<Stop>,
}

impl Service {
    /// Derive the whole-service cancellation flag from a stop list.
    ///
    /// The service counts as running as soon as one stop, scanned in travel
    /// order, still has its departure. Because the terminus has no departure
    /// to cancel, in practice this is only true when the departure from the
    /// origin is cancelled and every later departure is too.
    pub fn derive_cancelled(stops: &[Stop]) -> bool {
        stops.iter().all(|stop| stop.cancelled_departure)
    }

    /// Service date as `YYYY-MM-DD`.
    pub fn service_date_str(&self) -> String {
        self.service_date.format("%Y-%m-%d").to_string()
    }

    /// Returns the origin stop.
    pub fn origin(&self) -> Option<&Stop> {
        self.stops.first()
    }

    /// Returns the last stop.
    pub fn destination(&self) -> Option<&Stop> {
        self.stops.last()
    }

    /// Stop code of the last stop, or an empty string for an empty route.
    pub fn destination_code(&self) -> &str {
        self.destination()
            .map(|stop| stop.stop_code.as_str())
            .unwrap_or("")
    }

    /// Find a stop by code (case-insensitive).
    pub fn find_stop(&self, stop_code: &str) -> Option<&Stop> {
        let code = stop_code.to_lowercase();
        self.stops.iter().find(|stop| stop.stop_code == code)
    }

    /// Returns the number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns true if there are no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "i{} / {}{}-{} @ {} [{} stops]",
            self.service_id,
            self.transport_mode,
            self.service_number,
            self.destination_code(),
            self.service_date_str(),
            self.stops.len()
        )
    }
}
