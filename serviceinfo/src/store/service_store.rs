//! Reading and writing service records.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::debug;

use crate::domain::{ReadMode, Service, ServiceSource, Stop, format_iso_datetime, parse_iso_datetime};

use super::backend::{KeyValueBackend, WriteBatch};
use super::codec::{decode_bool, decode_int, decode_optional, encode_bool, encode_optional};
use super::error::StoreError;
use super::keys::{self, RecordKeys};

/// Service records on top of a key-value backend.
#[derive(Debug, Clone)]
pub struct ServiceStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> ServiceStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the transaction that (over)writes one record.
    ///
    /// The record's metadata and stop list are deleted first so no stop of
    /// an earlier version survives. Stops without any timestamp are left
    /// out.
    pub fn write_batch(service: &Service, source: ServiceSource) -> WriteBatch {
        let date = service.service_date;
        let record = RecordKeys::new(source, date, &service.service_id);
        let number = service.service_number.to_string();

        let mut batch = WriteBatch::new();
        batch
            .add_to_set(keys::service_numbers(source, date), number.clone())
            .add_to_set(
                keys::service_ids(source, date, service.service_number),
                service.service_id.clone(),
            )
            .delete(record.info())
            .delete(record.stops())
            .set_hash(
                record.info(),
                vec![
                    field("cancelled", encode_bool(service.cancelled)),
                    field("transport_mode", &service.transport_mode),
                    field("transport_mode_description", &service.transport_mode_description),
                    field("servicenumber", number),
                    field("company_code", encode_optional(service.company_code.as_deref())),
                    field("company_name", encode_optional(service.company_name.as_deref())),
                ],
            );

        for stop in service.stops.iter().filter(|s| s.has_schedule()) {
            batch
                .push_list(record.stops(), stop.stop_code.to_lowercase())
                .set_hash(record.stop(&stop.stop_code), stop_fields(stop));
        }

        batch
    }

    /// Write one record under `source`, replacing any earlier version.
    pub async fn store_service(&self, service: &Service, source: ServiceSource) -> Result<(), StoreError> {
        let batch = Self::write_batch(service, source);
        debug!(
            service = %service.service_id,
            number = service.service_number,
            date = %service.service_date,
            %source,
            ops = batch.len(),
            "storing service"
        );
        self.backend.commit(batch).await
    }

    /// Write each record in turn. Stops at the first failure; records
    /// already written stay written.
    pub async fn store_services(&self, services: &[Service], source: ServiceSource) -> Result<usize, StoreError> {
        for service in services {
            self.store_service(service, source).await?;
        }
        Ok(services.len())
    }

    /// Every record sharing a service number on `date`, ordered by id.
    ///
    /// In merged mode the `actual` partition answers if it knows the number
    /// at all; otherwise `scheduled` does. Returns `Ok(None)` when the
    /// selected partition does not know the number.
    pub async fn get_service(
        &self,
        date: NaiveDate,
        number: u32,
        mode: ReadMode,
    ) -> Result<Option<Vec<Service>>, StoreError> {
        let source = match mode {
            ReadMode::Merged => {
                if self.has_number(ServiceSource::Actual, date, number).await? {
                    ServiceSource::Actual
                } else {
                    ServiceSource::Scheduled
                }
            }
            ReadMode::Only(source) => source,
        };

        if !self.has_number(source, date, number).await? {
            return Ok(None);
        }

        let mut ids = self
            .backend
            .members(&keys::service_ids(source, date, number))
            .await?;
        ids.sort();

        let mut services = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(service) = self.read_record(source, date, id).await? {
                services.push(service);
            }
        }

        Ok(Some(services))
    }

    /// One record by service id, or `Ok(None)` when absent.
    ///
    /// In merged mode reads `actual` and falls back to `scheduled` when
    /// `actual` has no such record.
    pub async fn get_service_details(
        &self,
        date: NaiveDate,
        service_id: &str,
        mode: ReadMode,
    ) -> Result<Option<Service>, StoreError> {
        match mode {
            ReadMode::Only(source) => self.read_record(source, date, service_id).await,
            ReadMode::Merged => {
                match self.read_record(ServiceSource::Actual, date, service_id).await? {
                    Some(service) => Ok(Some(service)),
                    None => {
                        self.read_record(ServiceSource::Scheduled, date, service_id)
                            .await
                    }
                }
            }
        }
    }

    async fn has_number(&self, source: ServiceSource, date: NaiveDate, number: u32) -> Result<bool, StoreError> {
        self.backend
            .is_member(&keys::service_numbers(source, date), &number.to_string())
            .await
    }

    async fn read_record(
        &self,
        source: ServiceSource,
        date: NaiveDate,
        service_id: &str,
    ) -> Result<Option<Service>, StoreError> {
        let record = RecordKeys::new(source, date, service_id);
        let info_key = record.info();
        let info = self.backend.hash(&info_key).await?;
        if info.is_empty() {
            return Ok(None);
        }
        let info = Fields::new(&info_key, info);

        let mut stops = Vec::new();
        for code in self.backend.list(&record.stops()).await? {
            let stop_key = record.stop(&code);
            let fields = self.backend.hash(&stop_key).await?;
            stops.push(read_stop(&code, &Fields::new(&stop_key, fields))?);
        }

        Ok(Some(Service {
            service_id: service_id.to_string(),
            service_number: info.number("servicenumber")?,
            transport_mode: info.required("transport_mode")?.to_string(),
            transport_mode_description: info.required("transport_mode_description")?.to_string(),
            service_date: date,
            cancelled: info.boolean("cancelled")?,
            company_code: info.optional_text("company_code"),
            company_name: info.optional_text("company_name"),
            stops,
        }))
    }
}

fn field(name: &str, value: impl Into<String>) -> (String, String) {
    (name.to_string(), value.into())
}

fn stop_fields(stop: &Stop) -> Vec<(String, String)> {
    vec![
        field("arrival_time", encode_optional(stop.arrival_time.as_ref().map(format_iso_datetime))),
        field("departure_time", encode_optional(stop.departure_time.as_ref().map(format_iso_datetime))),
        field(
            "scheduled_arrival_platform",
            encode_optional(stop.scheduled_arrival_platform.as_deref()),
        ),
        field(
            "actual_arrival_platform",
            encode_optional(stop.actual_arrival_platform.as_deref()),
        ),
        field(
            "scheduled_departure_platform",
            encode_optional(stop.scheduled_departure_platform.as_deref()),
        ),
        field(
            "actual_departure_platform",
            encode_optional(stop.actual_departure_platform.as_deref()),
        ),
        field("arrival_delay", stop.arrival_delay.to_string()),
        field("departure_delay", stop.departure_delay.to_string()),
        field("stop_name", &stop.stop_name),
        field("cancelled_arrival", encode_bool(stop.cancelled_arrival)),
        field("cancelled_departure", encode_bool(stop.cancelled_departure)),
    ]
}

fn read_stop(code: &str, fields: &Fields<'_>) -> Result<Stop, StoreError> {
    let mut stop = Stop::new(code, fields.required("stop_name")?.to_string());
    stop.arrival_time = fields.optional_time("arrival_time")?;
    stop.departure_time = fields.optional_time("departure_time")?;
    stop.arrival_delay = fields.int("arrival_delay")?;
    stop.departure_delay = fields.int("departure_delay")?;
    stop.scheduled_arrival_platform = fields.optional_text("scheduled_arrival_platform");
    stop.actual_arrival_platform = fields.optional_text("actual_arrival_platform");
    stop.scheduled_departure_platform = fields.optional_text("scheduled_departure_platform");
    stop.actual_departure_platform = fields.optional_text("actual_departure_platform");
    stop.cancelled_arrival = fields.boolean("cancelled_arrival")?;
    stop.cancelled_departure = fields.boolean("cancelled_departure")?;
    Ok(stop)
}

/// Typed access to a stored hash, reporting failures against its key.
struct Fields<'a> {
    key: &'a str,
    values: HashMap<String, String>,
}

impl<'a> Fields<'a> {
    fn new(key: &'a str, values: HashMap<String, String>) -> Self {
        Self { key, values }
    }

    fn required(&self, name: &'static str) -> Result<&str, StoreError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| StoreError::MissingField {
                key: self.key.to_string(),
                field: name,
            })
    }

    /// Missing and sentinel values both read as `None`.
    fn optional_text(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .and_then(|v| decode_optional(v))
            .map(str::to_string)
    }

    fn invalid(&self, name: &'static str, value: &str) -> StoreError {
        StoreError::InvalidValue {
            key: self.key.to_string(),
            field: name,
            value: value.to_string(),
        }
    }

    fn boolean(&self, name: &'static str) -> Result<bool, StoreError> {
        let value = self.required(name)?;
        decode_bool(value).ok_or_else(|| self.invalid(name, value))
    }

    fn int(&self, name: &'static str) -> Result<i64, StoreError> {
        let value = self.required(name)?;
        decode_int(value).ok_or_else(|| self.invalid(name, value))
    }

    fn number(&self, name: &'static str) -> Result<u32, StoreError> {
        let value = self.required(name)?;
        value.parse().map_err(|_| self.invalid(name, value))
    }

    fn optional_time(&self, name: &'static str) -> Result<Option<DateTime<FixedOffset>>, StoreError> {
        match decode_optional(self.required(name)?) {
            None => Ok(None),
            Some(value) => parse_iso_datetime(value)
                .map(Some)
                .map_err(|_| self.invalid(name, value)),
        }
    }
}
