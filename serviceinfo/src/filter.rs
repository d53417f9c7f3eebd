//! Service filtering.
//!
//! A `ServiceFilter` lists operator codes, service-number ranges and
//! transport modes. A service passes when it satisfies any configured
//! criterion; a filter with no criteria passes nothing.

use std::path::Path;

use chrono::{DateTime, Duration, FixedOffset};
use serde::Deserialize;

use crate::domain::{Service, Stop};

/// Inclusive range of service numbers, written `[from, to]` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "(u32, u32)")]
pub struct ServiceRange {
    pub from: u32,
    pub to: u32,
}

impl ServiceRange {
    pub fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }

    /// Returns true if `number` lies within the range, bounds included.
    pub fn contains(&self, number: u32) -> bool {
        self.from <= number && number <= self.to
    }
}

impl From<(u32, u32)> for ServiceRange {
    fn from((from, to): (u32, u32)) -> Self {
        Self::new(from, to)
    }
}

/// Declarative service filter.
///
/// ```json
/// { "company": ["ns"], "service": [[100, 200]], "transport_mode": ["IC"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceFilter {
    /// Operator codes, compared case-insensitively
    #[serde(default)]
    pub company: Option<Vec<String>>,
    /// Service-number ranges
    #[serde(default)]
    pub service: Option<Vec<ServiceRange>>,
    /// Transport-mode codes, compared case-insensitively
    #[serde(default)]
    pub transport_mode: Option<Vec<String>>,
}

/// Errors loading a filter file.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("failed to read filter: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl ServiceFilter {
    /// Load a filter from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FilterError> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| FilterError::Json {
            message: e.to_string(),
        })
    }

    /// Returns true if no criterion is configured.
    pub fn is_empty(&self) -> bool {
        self.company.is_none() && self.service.is_none() && self.transport_mode.is_none()
    }

    /// Returns true if a configured range contains the service number.
    pub fn matches_number(&self, number: u32) -> bool {
        self.service
            .as_deref()
            .is_some_and(|ranges| ranges.iter().any(|r| r.contains(number)))
    }

    /// Shorthand for [`matches`].
    pub fn matches(&self, service: &Service) -> bool {
        matches(service, self)
    }
}

/// Returns true when the service satisfies one or more filter criteria.
///
/// # Examples
///
/// ```
/// use serviceinfo::filter::{ServiceFilter, ServiceRange};
///
/// let filter = ServiceFilter {
///     service: Some(vec![ServiceRange::new(100, 200)]),
///     ..Default::default()
/// };
/// assert!(!filter.is_empty());
/// assert!(!ServiceFilter::default().matches_number(150));
/// assert!(filter.matches_number(150));
/// ```
pub fn matches(service: &Service, filter: &ServiceFilter) -> bool {
    let company = filter.company.as_deref().is_some_and(|codes| {
        service
            .company_code
            .as_deref()
            .is_some_and(|code| contains_ignore_case(codes, code))
    });

    company
        || filter.matches_number(service.service_number)
        || filter
            .transport_mode
            .as_deref()
            .is_some_and(|modes| contains_ignore_case(modes, &service.transport_mode))
}

fn contains_ignore_case(candidates: &[String], value: &str) -> bool {
    candidates.iter().any(|c| c.eq_ignore_ascii_case(value))
}

/// Returns true when the stop departs between `now` and `minutes` from now.
///
/// A stop without a departure, or one that has already departed, never
/// matches.
pub fn departure_within(stop: &Stop, now: DateTime<FixedOffset>, minutes: i64) -> bool {
    let Some(departure) = stop.departure_time else {
        return false;
    };

    departure >= now && departure < now + Duration::minutes(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_iso_datetime;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn service(number: u32, company: Option<&str>, mode: &str) -> Service {
        Service {
            service_id: number.to_string(),
            service_number: number,
            transport_mode: mode.into(),
            transport_mode_description: String::new(),
            service_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            cancelled: false,
            company_code: company.map(Into::into),
            company_name: None,
            stops: vec![],
        }
    }

    fn filter(json: &str) -> ServiceFilter {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn criteria_are_or_combined() {
        let f = filter(r#"{"company": ["ns"], "service": [[100, 200]]}"#);
        assert!(matches(&service(9999, Some("NS"), "IC"), &f));
        assert!(matches(&service(150, Some("ARR"), "IC"), &f));
        assert!(!matches(&service(9999, Some("ARR"), "IC"), &f));
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let f = ServiceFilter::default();
        assert!(f.is_empty());
        assert!(!matches(&service(150, Some("NS"), "IC"), &f));
        assert!(!f.matches(&service(1, None, "SPR")));
    }

    #[test]
    fn empty_lists_match_nothing() {
        let f = filter(r#"{"company": [], "service": [], "transport_mode": []}"#);
        assert!(!f.is_empty());
        assert!(!matches(&service(150, Some("NS"), "IC"), &f));
    }

    #[test]
    fn ranges_are_inclusive() {
        let f = filter(r#"{"service": [[100, 200], [3000, 3999]]}"#);
        assert!(f.matches_number(100));
        assert!(f.matches_number(200));
        assert!(f.matches_number(3500));
        assert!(!f.matches_number(99));
        assert!(!f.matches_number(201));
    }

    #[test]
    fn transport_mode_case_insensitive() {
        let f = filter(r#"{"transport_mode": ["spr"]}"#);
        assert!(matches(&service(1, None, "SPR"), &f));
        assert!(!matches(&service(1, None, "IC"), &f));
    }

    #[test]
    fn missing_company_code_never_matches_company() {
        let f = filter(r#"{"company": ["ns"]}"#);
        assert!(!matches(&service(1, None, "IC"), &f));
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filter.json");
        std::fs::write(&path, r#"{"company": ["NS"]}"#).unwrap();

        let f = ServiceFilter::from_file(&path).unwrap();
        assert_eq!(f.company, Some(vec!["NS".to_string()]));
        assert_eq!(f.service, None);
    }

    #[test]
    fn invalid_filter_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filter.json");
        std::fs::write(&path, r#"{"service": [[1]]}"#).unwrap();

        let err = ServiceFilter::from_file(&path).unwrap_err();
        assert!(matches!(err, FilterError::Json { .. }));
    }

    #[test]
    fn departure_window() {
        let now = parse_iso_datetime("2024-05-01T10:00:00+02:00").unwrap();
        let mut stop = Stop::new("ut", "Utrecht Centraal".into());
        assert!(!departure_within(&stop, now, 30));

        stop.departure_time = Some(parse_iso_datetime("2024-05-01T10:20:00+02:00").unwrap());
        assert!(departure_within(&stop, now, 30));
        assert!(!departure_within(&stop, now, 20));

        stop.departure_time = Some(parse_iso_datetime("2024-05-01T09:59:00+02:00").unwrap());
        assert!(!departure_within(&stop, now, 30));

        stop.departure_time = Some(now);
        assert!(departure_within(&stop, now, 1));
    }
}
