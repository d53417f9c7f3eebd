//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Service, Stop, format_iso_datetime};

/// Query parameters shared by the lookup endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SourceQuery {
    /// `merged` (default), `scheduled` or `actual`
    pub source: Option<String>,
}

/// Response for a lookup by service number.
#[derive(Debug, Serialize)]
pub struct ServiceListResponse {
    pub services: Vec<ServiceResult>,
}

/// A service record.
#[derive(Debug, Serialize)]
pub struct ServiceResult {
    pub service_id: String,

    pub service_number: u32,

    /// Service date (YYYY-MM-DD)
    pub service_date: String,

    /// Transport mode code (e.g., "IC")
    pub transport_mode: String,

    pub transport_mode_description: String,

    pub company_code: Option<String>,

    pub company_name: Option<String>,

    /// Whether the whole service is cancelled
    pub cancelled: bool,

    /// Stops in travel order
    pub stops: Vec<StopResult>,
}

/// A stop on a service.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub stop_code: String,

    pub stop_name: String,

    /// Arrival time (RFC 3339)
    pub arrival_time: Option<String>,

    /// Departure time (RFC 3339)
    pub departure_time: Option<String>,

    /// Arrival delay in minutes
    pub arrival_delay: i64,

    /// Departure delay in minutes
    pub departure_delay: i64,

    pub scheduled_arrival_platform: Option<String>,

    pub actual_arrival_platform: Option<String>,

    pub scheduled_departure_platform: Option<String>,

    pub actual_departure_platform: Option<String>,

    pub cancelled_arrival: bool,

    pub cancelled_departure: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&Stop> for StopResult {
    fn from(stop: &Stop) -> Self {
        Self {
            stop_code: stop.stop_code.clone(),
            stop_name: stop.stop_name.clone(),
            arrival_time: stop.arrival_time.as_ref().map(format_iso_datetime),
            departure_time: stop.departure_time.as_ref().map(format_iso_datetime),
            arrival_delay: stop.arrival_delay,
            departure_delay: stop.departure_delay,
            scheduled_arrival_platform: stop.scheduled_arrival_platform.clone(),
            actual_arrival_platform: stop.actual_arrival_platform.clone(),
            scheduled_departure_platform: stop.scheduled_departure_platform.clone(),
            actual_departure_platform: stop.actual_departure_platform.clone(),
            cancelled_arrival: stop.cancelled_arrival,
            cancelled_departure: stop.cancelled_departure,
        }
    }
}

impl From<&Service> for ServiceResult {
    fn from(service: &Service) -> Self {
        Self {
            service_id: service.service_id.clone(),
            service_number: service.service_number,
            service_date: service.service_date_str(),
            transport_mode: service.transport_mode.clone(),
            transport_mode_description: service.transport_mode_description.clone(),
            company_code: service.company_code.clone(),
            company_name: service.company_name.clone(),
            cancelled: service.cancelled,
            stops: service.stops.iter().map(StopResult::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_iso_datetime;
    use chrono::NaiveDate;

    #[test]
    fn service_result_serializes() {
        let mut stop = Stop::new("UT", "Utrecht Centraal".into());
        stop.departure_time = Some(parse_iso_datetime("2024-05-01T10:02:00+02:00").unwrap());
        stop.departure_delay = 2;

        let service = Service {
            service_id: "1234".into(),
            service_number: 3500,
            transport_mode: "IC".into(),
            transport_mode_description: "Intercity".into(),
            service_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            cancelled: false,
            company_code: Some("NS".into()),
            company_name: None,
            stops: vec![stop],
        };

        let json = serde_json::to_value(ServiceResult::from(&service)).unwrap();
        assert_eq!(json["service_date"], "2024-05-01");
        assert_eq!(json["service_number"], 3500);
        assert_eq!(json["company_name"], serde_json::Value::Null);
        assert_eq!(json["stops"][0]["stop_code"], "ut");
        assert_eq!(json["stops"][0]["departure_time"], "2024-05-01T10:02:00+02:00");
        assert_eq!(json["stops"][0]["arrival_time"], serde_json::Value::Null);
        assert_eq!(json["stops"][0]["departure_delay"], 2);
    }
}
