//! State and mandi lookups for the rate entry form and filters

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use super::dto::{LookupMetadata, MandiQuery, MandisResponse, StatesResponse};
use crate::application::services::{Lookup, LookupService, LookupSource};
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse};

#[derive(Clone)]
pub struct MetaState {
    pub lookup_service: Arc<LookupService>,
}

fn metadata<T>(lookup: &Lookup<T>, started: Instant, state_id: Option<i32>) -> LookupMetadata {
    LookupMetadata {
        source: lookup.source.as_str().to_string(),
        response_time: format!("{}ms", started.elapsed().as_millis()),
        timestamp: Utc::now(),
        count: lookup.data.len(),
        state_id,
        warning: lookup.warning.clone(),
    }
}

/// Database results are cached for an hour, fallback lists for five minutes.
fn lookup_headers(source: LookupSource, response_time: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let cache = match source {
        LookupSource::Database => "public, max-age=3600, stale-while-revalidate=86400",
        LookupSource::Fallback => "public, max-age=300, stale-while-revalidate=600",
    };
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache));
    if let Ok(value) = HeaderValue::from_str(response_time) {
        headers.insert("x-response-time", value);
    }
    if source == LookupSource::Fallback {
        headers.insert("x-data-source", HeaderValue::from_static("fallback"));
    }
    headers
}

#[utoipa::path(
    get,
    path = "/api/meta/states",
    tag = "Lookups",
    responses(
        (status = 200, description = "States ordered by name", body = StatesResponse),
        (status = 500, description = "Lookup failed", body = ApiResponse<String>)
    )
)]
pub async fn list_states(State(state): State<MetaState>) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let lookup = state.lookup_service.states().await.map_err(domain_error)?;

    let metadata = metadata(&lookup, started, None);
    let headers = lookup_headers(lookup.source, &metadata.response_time);
    Ok((
        headers,
        Json(StatesResponse { success: true, data: lookup.data, metadata }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/meta/mandis",
    tag = "Lookups",
    params(MandiQuery),
    responses(
        (status = 200, description = "Mandis ordered by name, optionally within one state", body = MandisResponse),
        (status = 500, description = "Lookup failed", body = ApiResponse<String>)
    )
)]
pub async fn list_mandis(
    State(state): State<MetaState>,
    Query(query): Query<MandiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let lookup = state
        .lookup_service
        .mandis(query.state_id)
        .await
        .map_err(domain_error)?;

    let metadata = metadata(&lookup, started, query.state_id);
    let headers = lookup_headers(lookup.source, &metadata.response_time);
    Ok((
        headers,
        Json(MandisResponse { success: true, data: lookup.data, metadata }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_headers_mark_the_source() {
        let headers = lookup_headers(LookupSource::Fallback, "3ms");
        assert_eq!(headers["x-data-source"], "fallback");
        assert_eq!(headers["x-response-time"], "3ms");
        assert!(headers[header::CACHE_CONTROL].to_str().unwrap().contains("max-age=300"));

        let headers = lookup_headers(LookupSource::Database, "3ms");
        assert!(headers.get("x-data-source").is_none());
    }
}
