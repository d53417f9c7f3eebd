//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::domain::ReadMode;
use crate::store::StoreError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/service/:date/:number", get(service_by_number))
        .route("/service/:date/id/:service_id", get(service_by_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// All services sharing a number on a date.
pub async fn service_by_number(
    State(state): State<AppState>,
    Path((date, number)): Path<(String, String)>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<ServiceListResponse>, AppError> {
    let date = parse_date(&date)?;
    let number: u32 = number.parse().map_err(|_| AppError::BadRequest {
        message: format!("invalid service number '{number}'"),
    })?;
    let mode = parse_mode(&query)?;

    let services = state
        .store
        .get_service(date, number, mode)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("no service {number} on {date}"),
        })?;

    Ok(Json(ServiceListResponse {
        services: services.iter().map(ServiceResult::from).collect(),
    }))
}

/// One service by id.
pub async fn service_by_id(
    State(state): State<AppState>,
    Path((date, service_id)): Path<(String, String)>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<ServiceResult>, AppError> {
    let date = parse_date(&date)?;
    let mode = parse_mode(&query)?;

    let service = state
        .store
        .get_service_details(date, &service_id, mode)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("no service with id {service_id} on {date}"),
        })?;

    Ok(Json(ServiceResult::from(&service)))
}

fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| AppError::BadRequest {
        message: format!("invalid date '{s}', expected YYYY-MM-DD"),
    })
}

fn parse_mode(query: &SourceQuery) -> Result<ReadMode, AppError> {
    match query.source.as_deref() {
        None => Ok(ReadMode::Merged),
        Some(source) => source.parse::<ReadMode>().map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        }),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => {
                error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::{CacheConfig, CachedServiceStore};
    use crate::domain::{Service, ServiceSource, Stop, parse_iso_datetime};
    use crate::store::{MemoryBackend, ServiceStore, SharedBackend};

    fn state() -> AppState {
        let backend: SharedBackend = Arc::new(MemoryBackend::new());
        AppState::new(CachedServiceStore::new(
            ServiceStore::new(backend),
            &CacheConfig::default(),
        ))
    }

    fn service(id: &str, number: u32) -> Service {
        let mut origin = Stop::new("asd", "Amsterdam Centraal".into());
        origin.departure_time = Some(parse_iso_datetime("2024-05-01T08:15:00+02:00").unwrap());
        let mut terminus = Stop::new("ut", "Utrecht Centraal".into());
        terminus.arrival_time = Some(parse_iso_datetime("2024-05-01T08:42:00+02:00").unwrap());
        terminus.scheduled_arrival_platform = Some("18".into());

        Service {
            service_id: id.into(),
            service_number: number,
            transport_mode: "SPR".into(),
            transport_mode_description: "Sprinter".into(),
            service_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            cancelled: false,
            company_code: Some("NS".into()),
            company_name: Some("Nederlandse Spoorwegen".into()),
            stops: vec![origin, terminus],
        }
    }

    fn path(a: &str, b: &str) -> Path<(String, String)> {
        Path((a.to_string(), b.to_string()))
    }

    fn query(source: Option<&str>) -> Query<SourceQuery> {
        Query(SourceQuery {
            source: source.map(str::to_string),
        })
    }

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[tokio::test]
    async fn lookup_by_number() {
        let state = state();
        state
            .store
            .store_service(&service("7", 5000), ServiceSource::Scheduled)
            .await
            .unwrap();

        let Json(response) = service_by_number(State(state), path("2024-05-01", "5000"), query(None))
            .await
            .unwrap();

        assert_eq!(response.services.len(), 1);
        let found = &response.services[0];
        assert_eq!(found.service_id, "7");
        assert_eq!(found.stops.len(), 2);
        assert_eq!(found.stops[1].scheduled_arrival_platform.as_deref(), Some("18"));
    }

    #[tokio::test]
    async fn lookup_by_number_honours_source() {
        let state = state();
        state
            .store
            .store_service(&service("7", 5000), ServiceSource::Scheduled)
            .await
            .unwrap();

        let err = service_by_number(State(state), path("2024-05-01", "5000"), query(Some("actual")))
            .await
            .unwrap_err();
        assert_eq!(status(err), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lookup_by_id() {
        let state = state();
        state
            .store
            .store_service(&service("7", 5000), ServiceSource::Actual)
            .await
            .unwrap();

        let Json(found) = service_by_id(State(state.clone()), path("2024-05-01", "7"), query(Some("merged")))
            .await
            .unwrap();
        assert_eq!(found.service_number, 5000);
        assert_eq!(found.company_name.as_deref(), Some("Nederlandse Spoorwegen"));

        let err = service_by_id(State(state), path("2024-05-01", "8"), query(None))
            .await
            .unwrap_err();
        assert_eq!(status(err), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bad_requests() {
        let err = service_by_number(State(state()), path("01-05-2024", "5000"), query(None))
            .await
            .unwrap_err();
        assert_eq!(status(err), StatusCode::BAD_REQUEST);

        let err = service_by_number(State(state()), path("2024-05-01", "IC5000"), query(None))
            .await
            .unwrap_err();
        assert_eq!(status(err), StatusCode::BAD_REQUEST);

        let err = service_by_id(State(state()), path("2024-05-01", "7"), query(Some("live")))
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::BadRequest { message } if message.contains("live")));
        assert_eq!(status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_are_internal() {
        let err = AppError::from(StoreError::WrongType { key: "k".into() });
        assert_eq!(status(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_check() {
        assert_eq!(health().await, "ok");
    }
}
