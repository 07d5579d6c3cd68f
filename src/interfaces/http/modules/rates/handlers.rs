//! Rate read endpoints (public) and rate mutations (admin)

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use super::dto::{
    CreateRateRequest, MultiSeriesResponse, Pagination, PublicRatesResponse,
    PublicRatesUnavailable, RateListResponse, RateQuery, SeriesPoint, SeriesResponse,
    SeriesWindowQuery, UpdateRateRequest,
};
use crate::application::{ChartService, RateService};
use crate::domain::rate::{Rate, RateCard, RateFilter, RateListing, RatePatch, UpsertOutcome};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, IdResponse, PaginatedResponse, ValidatedJson,
};

#[derive(Clone)]
pub struct RatesState {
    pub rate_service: Arc<RateService>,
    pub chart_service: Arc<ChartService>,
}

const NO_STORE: [(header::HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

#[utoipa::path(
    get,
    path = "/api/rates",
    tag = "Rates",
    params(RateQuery),
    responses(
        (status = 200, description = "One page of rates, newest first", body = RateListResponse),
        (status = 500, description = "Database failure", body = ApiResponse<String>)
    )
)]
pub async fn list_rates(
    State(state): State<RatesState>,
    Query(query): Query<RateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .rate_service
        .list(&query.filter(), query.page(), query.page_size())
        .await
        .map_err(domain_error)?;

    let body = RateListResponse {
        data: page.items,
        last_updated: page.last_updated,
        pagination: Pagination {
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        },
    };
    Ok((NO_STORE, Json(body)))
}

#[utoipa::path(
    get,
    path = "/api/rates/series",
    tag = "Rates",
    params(RateQuery),
    responses((status = 200, description = "Average price per day, ascending", body = SeriesResponse))
)]
pub async fn rate_series(
    State(state): State<RatesState>,
    Query(query): Query<RateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Rate type, country and packing do not apply to the daily chart.
    let filter = RateFilter {
        rate_type: None,
        country: None,
        packing: None,
        ..query.filter()
    };
    let series = state
        .chart_service
        .daily_series(&filter)
        .await
        .map_err(domain_error)?;

    Ok((
        NO_STORE,
        Json(SeriesResponse {
            data: series.points.into_iter().map(SeriesPoint::from).collect(),
            last_updated: series.last_updated,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/rates/series/multi",
    tag = "Rates",
    params(SeriesWindowQuery),
    responses((status = 200, description = "Per size-bucket and quality series", body = MultiSeriesResponse))
)]
pub async fn rate_series_multi(
    State(state): State<RatesState>,
    Query(window): Query<SeriesWindowQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Utc::now().date_naive();
    let bucketed = state
        .chart_service
        .bucketed_series(window.date_from, window.date_to, today)
        .await
        .map_err(domain_error)?;

    Ok((
        NO_STORE,
        Json(MultiSeriesResponse {
            labels: bucketed.chart.labels,
            series: bucketed.chart.series,
            last_updated: bucketed.last_updated,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/public/rates",
    tag = "Rates",
    responses(
        (status = 200, description = "Latest rates as display cards", body = PublicRatesResponse),
        (status = 503, description = "Database failure, built-in cards returned", body = PublicRatesUnavailable)
    )
)]
pub async fn public_rates(State(state): State<RatesState>) -> Response {
    match state.rate_service.public_board().await {
        Ok(cards) => (
            NO_STORE,
            Json(PublicRatesResponse {
                success: true,
                count: cards.len(),
                data: cards,
                timestamp: Utc::now(),
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Public rates unavailable, serving fallback cards");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(PublicRatesUnavailable {
                    success: false,
                    fallback: RateCard::fallback(),
                    error: "Service unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/rates",
    tag = "Admin Rates",
    security(("admin_token" = [])),
    params(RateQuery),
    responses(
        (status = 200, description = "Rates page", body = PaginatedResponse<RateListing>),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn admin_list_rates(
    State(state): State<RatesState>,
    Query(query): Query<RateQuery>,
) -> Result<Json<PaginatedResponse<RateListing>>, ApiError> {
    let page = state
        .rate_service
        .list(&query.filter(), query.page(), query.page_size())
        .await
        .map_err(domain_error)?;

    Ok(Json(PaginatedResponse {
        items: page.items,
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/rates",
    tag = "Admin Rates",
    security(("admin_token" = [])),
    request_body = CreateRateRequest,
    responses(
        (status = 201, description = "Rate created", body = ApiResponse<Rate>),
        (status = 200, description = "Existing row for the same key repriced", body = ApiResponse<Rate>),
        (status = 400, description = "Violates rate type rules or unknown location"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn create_rate(
    State(state): State<RatesState>,
    ValidatedJson(request): ValidatedJson<CreateRateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Rate>>), ApiError> {
    let outcome = state
        .rate_service
        .create(request.into())
        .await
        .map_err(domain_error)?;

    let status = match &outcome {
        UpsertOutcome::Created(rate) => {
            info!(rate_id = rate.id, "Rate created");
            StatusCode::CREATED
        }
        UpsertOutcome::Updated(rate) => {
            info!(rate_id = rate.id, "Rate repriced");
            StatusCode::OK
        }
    };
    Ok((status, Json(ApiResponse::success(outcome.into_rate()))))
}

#[utoipa::path(
    put,
    path = "/api/admin/rates/{id}",
    tag = "Admin Rates",
    security(("admin_token" = [])),
    params(("id" = i32, Path, description = "Rate id")),
    request_body = UpdateRateRequest,
    responses(
        (status = 200, description = "Rate updated", body = ApiResponse<Rate>),
        (status = 400, description = "Empty patch or invalid result"),
        (status = 404, description = "Rate not found")
    )
)]
pub async fn update_rate(
    State(state): State<RatesState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateRateRequest>,
) -> Result<Json<ApiResponse<Rate>>, ApiError> {
    let patch = RatePatch::from(request);
    if patch.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("No fields to update")),
        ));
    }

    let rate = state
        .rate_service
        .update(id, patch)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(rate)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/rates/{id}",
    tag = "Admin Rates",
    security(("admin_token" = [])),
    params(("id" = i32, Path, description = "Rate id")),
    responses(
        (status = 200, description = "Rate deleted", body = ApiResponse<IdResponse>),
        (status = 404, description = "Rate not found")
    )
)]
pub async fn delete_rate(
    State(state): State<RatesState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    state.rate_service.delete(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(IdResponse { id })))
}
