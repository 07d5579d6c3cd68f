//! Back-office dashboard figures

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::ChartService;
use crate::infrastructure::database::entities::announcement;
use crate::interfaces::http::common::{db_error, domain_error, ApiError};

#[derive(Clone)]
pub struct AnalyticsState {
    pub db: DatabaseConnection,
    pub chart_service: Arc<ChartService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayAverage {
    #[schema(example = "2025-05-01")]
    pub date: String,
    pub avg: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsCounts {
    pub announcements_total: u64,
    pub rates_total: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    /// `null` until a rate is entered for today
    pub today_avg: Option<f64>,
    pub last7: Vec<DayAverage>,
    pub counts: AnalyticsCounts,
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    tag = "Analytics",
    security(("admin_token" = [])),
    responses((status = 200, description = "Today's average, last seven days and totals", body = AnalyticsResponse))
)]
pub async fn analytics(State(state): State<AnalyticsState>) -> Result<Json<AnalyticsResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let summary = state
        .chart_service
        .weekly_summary(today)
        .await
        .map_err(domain_error)?;
    let announcements_total = announcement::Entity::find()
        .count(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(AnalyticsResponse {
        today_avg: summary.today_avg,
        last7: summary
            .last7
            .into_iter()
            .map(|(date, avg)| DayAverage { date: date.format("%Y-%m-%d").to_string(), avg })
            .collect(),
        counts: AnalyticsCounts {
            announcements_total,
            rates_total: summary.rates_total,
        },
    }))
}
