//! Message ingestion: parse, filter, store.

use tracing::{debug, info};

use crate::arnu::{ParseError, parse_message};
use crate::domain::ServiceSource;
use crate::filter::ServiceFilter;
use crate::reference::ReferenceData;
use crate::store::{KeyValueBackend, ServiceStore, StoreError};

/// Errors ingesting one message.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counts for one ingested message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Services found in the message
    pub parsed: usize,
    /// Services written
    pub stored: usize,
}

impl IngestReport {
    /// Services dropped by the filter.
    pub fn filtered(&self) -> usize {
        self.parsed - self.stored
    }
}

/// Parse one message and store its services under `source`.
///
/// With a filter, only services it matches are stored. Returns `Ok(None)`
/// for a message whose envelope does not decode.
pub async fn ingest_message<R, B>(
    raw: &[u8],
    reference: &R,
    filter: Option<&ServiceFilter>,
    store: &ServiceStore<B>,
    source: ServiceSource,
) -> Result<Option<IngestReport>, IngestError>
where
    R: ReferenceData,
    B: KeyValueBackend,
{
    let Some(services) = parse_message(raw, reference)? else {
        return Ok(None);
    };

    let mut report = IngestReport {
        parsed: services.len(),
        stored: 0,
    };

    for service in &services {
        if let Some(filter) = filter
            && !filter.matches(service)
        {
            debug!(service = %service, "filtered out");
            continue;
        }
        store.store_service(service, source).await?;
        report.stored += 1;
    }

    info!(
        parsed = report.parsed,
        stored = report.stored,
        %source,
        "message ingested"
    );
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReadMode;
    use crate::reference::StaticReferenceData;
    use crate::store::MemoryBackend;
    use chrono::NaiveDate;

    const MESSAGE: &str = r#"<PutServiceInfoIn><ServiceInfoList>
        <ServiceInfo>
            <ServiceCode>3500</ServiceCode>
            <TransportModeCode>IC</TransportModeCode>
            <CompanyCode>NS</CompanyCode>
            <StopList>
                <Stop><StopCode>UT</StopCode><Departure>2024-05-01T10:02:00+02:00</Departure><DeparturePlatform>5</DeparturePlatform></Stop>
                <Stop><StopCode>EHV</StopCode><Arrival>2024-05-01T10:52:00+02:00</Arrival><ArrivalTimeDelay>PT2M</ArrivalTimeDelay></Stop>
            </StopList>
        </ServiceInfo>
        <ServiceInfo>
            <ServiceCode>7400</ServiceCode>
            <TransportModeCode>SPR</TransportModeCode>
            <CompanyCode>ARR</CompanyCode>
            <StopList>
                <Stop><StopCode>UT</StopCode><Departure>2024-05-01T11:00:00+02:00</Departure></Stop>
                <Stop><StopCode>EHV</StopCode><Arrival>2024-05-01T12:10:00+02:00</Arrival></Stop>
            </StopList>
        </ServiceInfo>
    </ServiceInfoList></PutServiceInfoIn>"#;

    fn reference() -> StaticReferenceData {
        StaticReferenceData::new()
            .with_transport_mode("IC", "Intercity")
            .with_transport_mode("SPR", "Sprinter")
            .with_station("ut", "Utrecht Centraal")
            .with_station("ehv", "Eindhoven")
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn stores_every_service_without_filter() {
        let store = ServiceStore::new(MemoryBackend::new());
        let report = ingest_message(MESSAGE.as_bytes(), &reference(), None, &store, ServiceSource::Actual)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report, IngestReport { parsed: 2, stored: 2 });

        let found = store
            .get_service(date(), 3500, ReadMode::Merged)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found[0].stops[1].arrival_delay, 2);
        assert_eq!(found[0].stops[0].scheduled_departure_platform.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn filter_limits_what_is_stored() {
        let store = ServiceStore::new(MemoryBackend::new());
        let filter: ServiceFilter = serde_json::from_str(r#"{"company": ["ns"]}"#).unwrap();
        let report = ingest_message(
            MESSAGE.as_bytes(),
            &reference(),
            Some(&filter),
            &store,
            ServiceSource::Scheduled,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(report.stored, 1);
        assert_eq!(report.filtered(), 1);
        assert!(store.get_service(date(), 3500, ReadMode::Merged).await.unwrap().is_some());
        assert!(store.get_service(date(), 7400, ReadMode::Merged).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_message_stores_nothing() {
        let store = ServiceStore::new(MemoryBackend::new());
        let result = ingest_message(b"<PutServiceInfoIn>", &reference(), None, &store, ServiceSource::Actual)
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(store.backend().keys().await.is_empty());
    }

    #[tokio::test]
    async fn parse_error_stores_nothing() {
        let store = ServiceStore::new(MemoryBackend::new());
        let reference = StaticReferenceData::new().with_transport_mode("IC", "Intercity");
        let err = ingest_message(MESSAGE.as_bytes(), &reference, None, &store, ServiceSource::Actual)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
        assert!(store.backend().keys().await.is_empty());
    }
}
