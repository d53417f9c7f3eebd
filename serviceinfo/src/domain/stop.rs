//! Stop types for transport services.
//!
//! A `Stop` is one station visit within a service's route, with arrival
//! and departure timestamps, delays, platforms and cancellation state.
//! Stops have no identity outside the service that owns them.

use chrono::{DateTime, FixedOffset};

/// A station visit on a service.
///
/// # Time Semantics
///
/// - For the origin only the departure is normally present
/// - For the terminus only the arrival is normally present
/// - A stop with neither carries no schedule information and is never
///   persisted
///
/// Arrival and departure cancellation are independent: a stop downstream of
/// a cancelled stop cannot be arrived at, while a stop that is itself
/// cancelled cannot be departed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Lower-cased stop code
    pub stop_code: String,
    /// Human station name
    pub stop_name: String,
    /// Arrival timestamp
    pub arrival_time: Option<DateTime<FixedOffset>>,
    /// Departure timestamp
    pub departure_time: Option<DateTime<FixedOffset>>,
    /// Arrival delay in whole minutes
    pub arrival_delay: i64,
    /// Departure delay in whole minutes
    pub departure_delay: i64,
    pub scheduled_arrival_platform: Option<String>,
    pub actual_arrival_platform: Option<String>,
    pub scheduled_departure_platform: Option<String>,
    pub actual_departure_platform: Option<String>,
    /// The service will not arrive here
    pub cancelled_arrival: bool,
    /// The service will not depart from here
    pub cancelled_departure: bool,
}

impl Stop {
    /// Creates a stop with no times, no platforms and no cancellations.
    ///
    /// The stop code is lower-cased.
    ///
    /// # Examples
    ///
    /// ```
    /// use serviceinfo::domain::Stop;
    ///
    /// let stop = Stop::new("UT", "Utrecht Centraal".into());
    /// assert_eq!(stop.stop_code, "ut");
    /// assert!(!stop.has_schedule());
    /// ```
    pub fn new(stop_code: &str, stop_name: String) -> Self {
        Self {
            stop_code: stop_code.to_lowercase(),
            stop_name,
            arrival_time: None,
            departure_time: None,
            arrival_delay: 0,
            departure_delay: 0,
            scheduled_arrival_platform: None,
            actual_arrival_platform: None,
            scheduled_departure_platform: None,
            actual_departure_platform: None,
            cancelled_arrival: false,
            cancelled_departure: false,
        }
    }

    /// Returns true if the stop has an arrival or a departure timestamp.
    pub fn has_schedule(&self) -> bool {
        self.arrival_time.is_some() || self.departure_time.is_some()
    }

    /// Returns the platform the service actually arrives at, falling back to
    /// the scheduled platform.
    pub fn arrival_platform(&self) -> Option<&str> {
        self.actual_arrival_platform
            .as_deref()
            .or(self.scheduled_arrival_platform.as_deref())
    }

    /// Returns the platform the service actually departs from, falling back
    /// to the scheduled platform.
    pub fn departure_platform(&self) -> Option<&str> {
        self.actual_departure_platform
            .as_deref()
            .or(self.scheduled_departure_platform.as_deref())
    }

    /// Returns true if the departure platform differs from the scheduled one.
    pub fn departure_platform_changed(&self) -> bool {
        match (
            &self.scheduled_departure_platform,
            &self.actual_departure_platform,
        ) {
            (Some(scheduled), Some(actual)) => scheduled != actual,
            _ => false,
        }
    }

    /// Returns true if the stop is neither arrived at nor departed from.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_arrival && self.cancelled_departure
    }
}
