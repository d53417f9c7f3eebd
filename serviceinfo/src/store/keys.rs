//! Key templates for the persisted layout.
//!
//! These strings are the on-disk format shared with existing data sets and
//! must not change.

use chrono::NaiveDate;

use crate::domain::ServiceSource;

fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Set of service numbers known for a source and date.
pub fn service_numbers(source: ServiceSource, date: NaiveDate) -> String {
    format!("services:{}:{}", source, date_str(date))
}

/// Set of service ids sharing one service number.
pub fn service_ids(source: ServiceSource, date: NaiveDate, number: u32) -> String {
    format!("services:{}:{}:{}", source, date_str(date), number)
}

/// Keys of one service record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    prefix: String,
}

impl RecordKeys {
    pub fn new(source: ServiceSource, date: NaiveDate, service_id: &str) -> Self {
        Self {
            prefix: format!("schedule:{}:{}:{}", source, date_str(date), service_id),
        }
    }

    /// Hash of service metadata.
    pub fn info(&self) -> String {
        format!("{}:info", self.prefix)
    }

    /// List of stop codes in travel order.
    pub fn stops(&self) -> String {
        format!("{}:stops", self.prefix)
    }

    /// Hash of one stop's fields. The code is lower-cased.
    pub fn stop(&self, stop_code: &str) -> String {
        format!("{}:stops:{}", self.prefix, stop_code.to_lowercase())
    }
}
