//! Liveness plus a database probe

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::application::SharedEventBus;

#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub event_bus: SharedEventBus,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: ComponentHealth,
    /// Open `/api/events` streams
    pub stream_subscribers: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let probe_started = Instant::now();
    let probe = state
        .db
        .execute(Statement::from_string(
            state.db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await;

    let (status, database) = match probe {
        Ok(_) => (
            StatusCode::OK,
            ComponentHealth {
                status: "ok".to_string(),
                latency_ms: Some(probe_started.elapsed().as_millis() as u64),
            },
        ),
        Err(e) => {
            warn!(error = %e, "Health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ComponentHealth { status: "error".to_string(), latency_ms: None },
            )
        }
    };

    let body = HealthResponse {
        status: if status == StatusCode::OK { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database,
        stream_subscribers: state.event_bus.subscriber_count(),
    };
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::create_event_bus;
    use crate::infrastructure::database::testing::test_db;

    #[tokio::test]
    async fn reports_ok_and_subscriber_count() {
        let bus = create_event_bus();
        let _stream = bus.subscribe_channel(4);
        let state = HealthState {
            db: test_db().await,
            event_bus: bus.clone(),
            started_at: Arc::new(Instant::now()),
        };

        let (status, Json(body)) = health_check(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.database.status, "ok");
        assert_eq!(body.stream_subscribers, 1);
    }

    #[tokio::test]
    async fn closed_database_is_degraded() {
        let db = test_db().await;
        db.clone().close().await.unwrap();
        let state = HealthState {
            db,
            event_bus: create_event_bus(),
            started_at: Arc::new(Instant::now()),
        };

        let (status, Json(body)) = health_check(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
    }
}
