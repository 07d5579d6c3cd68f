//! Rate request/response DTOs
//!
//! Field names are camelCase on the wire; the public site depends on them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::MAX_PAGE;
use crate::domain::rate::{
    ChartSeries, DailyAverage, Packing, Quality, RateCard, RateDraft, RateFilter, RateListing,
    RatePatch, RateType,
};
use crate::shared::serde_ext::{
    empty_string_as_none, flexible_date, nullable, optional_flexible_date,
};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Filters and paging for `GET /api/rates` and `GET /api/admin/rates`.
/// Empty values (`?stateId=`) mean "no filter".
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RateQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<RateType>)]
    pub rate_type: Option<RateType>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub state_id: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub mandi_id: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<Quality>)]
    pub quality: Option<Quality>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<Packing>)]
    pub packing: Option<Packing>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub size_min: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub size_max: Option<i32>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    #[serde(default, deserialize_with = "optional_flexible_date")]
    #[param(value_type = Option<String>)]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_flexible_date")]
    #[param(value_type = Option<String>)]
    pub date_to: Option<NaiveDate>,
    /// 1-based, default 1, capped at 1,000,000
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u64>,
    /// 1..=100, default 20
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page_size: Option<u64>,
}

impl RateQuery {
    pub fn filter(&self) -> RateFilter {
        RateFilter {
            rate_type: self.rate_type,
            country: self.country.clone(),
            state_id: self.state_id,
            mandi_id: self.mandi_id,
            quality: self.quality,
            packing: self.packing,
            size_min: self.size_min,
            size_max: self.size_max,
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Window for `GET /api/rates/series/multi`; last 60 days when both are absent.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SeriesWindowQuery {
    #[serde(default, deserialize_with = "optional_flexible_date")]
    #[param(value_type = Option<String>)]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_flexible_date")]
    #[param(value_type = Option<String>)]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateListResponse {
    pub data: Vec<RateListing>,
    pub last_updated: Option<DateTime<Utc>>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    #[schema(value_type = String, example = "2025-05-01")]
    pub date: String,
    pub avg_price: f64,
    pub count: i64,
}

impl From<DailyAverage> for SeriesPoint {
    fn from(d: DailyAverage) -> Self {
        Self {
            date: d.date.format("%Y-%m-%d").to_string(),
            avg_price: d.avg_price,
            count: d.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    pub data: Vec<SeriesPoint>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultiSeriesResponse {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicRatesResponse {
    pub success: bool,
    pub data: Vec<RateCard>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicRatesUnavailable {
    pub success: bool,
    pub fallback: Vec<RateCard>,
    pub error: String,
}

fn default_rate_type() -> RateType {
    RateType::Domestic
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRateRequest {
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    #[serde(deserialize_with = "flexible_date")]
    #[schema(value_type = String, example = "2025-05-01")]
    pub date: NaiveDate,
    #[serde(default = "default_rate_type")]
    pub rate_type: RateType,
    #[validate(range(min = 1, message = "must be a valid state id"))]
    pub state_id: Option<i32>,
    #[validate(range(min = 1, message = "must be a valid mandi id"))]
    pub mandi_id: Option<i32>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    /// Required for DOMESTIC, defaults to MEDIUM for EXPORT
    pub quality: Option<Quality>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub size_mm: i32,
    pub packing: Packing,
    #[validate(length(max = 255))]
    pub packing_description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than zero"))]
    pub price_per_kg: f64,
}

impl From<CreateRateRequest> for RateDraft {
    fn from(r: CreateRateRequest) -> Self {
        RateDraft {
            rate_type: r.rate_type,
            date: r.date,
            state_id: r.state_id,
            mandi_id: r.mandi_id,
            country: r.country,
            quality: r.quality,
            size_mm: r.size_mm,
            packing: r.packing,
            packing_description: r.packing_description,
            price_per_kg: r.price_per_kg,
        }
    }
}

/// Partial update. Absent fields are left alone; `null` clears nullable ones.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRateRequest {
    pub rate_type: Option<RateType>,
    #[serde(default, deserialize_with = "optional_flexible_date")]
    #[schema(value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub state_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub mandi_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub country: Option<Option<String>>,
    pub quality: Option<Quality>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub size_mm: Option<i32>,
    pub packing: Option<Packing>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub packing_description: Option<Option<String>>,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than zero"))]
    pub price_per_kg: Option<f64>,
}

impl From<UpdateRateRequest> for RatePatch {
    fn from(r: UpdateRateRequest) -> Self {
        RatePatch {
            rate_type: r.rate_type,
            date: r.date,
            state_id: r.state_id,
            mandi_id: r.mandi_id,
            country: r.country,
            quality: r.quality,
            size_mm: r.size_mm,
            packing: r.packing,
            packing_description: r.packing_description,
            price_per_kg: r.price_per_kg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn query(qs: &str) -> RateQuery {
        let uri: Uri = format!("/api/rates?{qs}").parse().unwrap();
        Query::<RateQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn query_defaults_and_clamps_paging() {
        let q = query("page=0&pageSize=500");
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), MAX_PAGE_SIZE);

        let q = query("");
        assert_eq!((q.page(), q.page_size()), (1, DEFAULT_PAGE_SIZE));

        let q = query("page=18446744073709551615");
        assert_eq!(q.page(), MAX_PAGE);
        assert!((q.page() - 1).checked_mul(q.page_size()).is_some());
    }

    #[test]
    fn query_ignores_empty_values_and_parses_filters() {
        let q = query("stateId=&mandiId=3&quality=high&rateType=DOMESTIC&dateFrom=2025-05-01&dateTo=");
        let f = q.filter();
        assert_eq!(f.state_id, None);
        assert_eq!(f.mandi_id, Some(3));
        assert_eq!(f.quality, Some(Quality::High));
        assert_eq!(f.rate_type, Some(RateType::Domestic));
        assert_eq!(f.date_from, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(f.date_to, None);
    }

    #[test]
    fn create_request_defaults_to_domestic() {
        let req: CreateRateRequest = serde_json::from_str(
            r#"{"date":"2025-05-01T00:00:00.000Z","stateId":1,"mandiId":1,"quality":"HIGH",
                "sizeMm":45,"packing":"BAG","pricePerKg":21.5}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        let draft = RateDraft::from(req);
        assert_eq!(draft.rate_type, RateType::Domestic);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    }

    #[test]
    fn update_request_keeps_null_distinct_from_absent() {
        let req: UpdateRateRequest =
            serde_json::from_str(r#"{"country":null,"pricePerKg":19}"#).unwrap();
        let patch = RatePatch::from(req);
        assert_eq!(patch.country, Some(None));
        assert_eq!(patch.state_id, None);
        assert_eq!(patch.price_per_kg, Some(19.0));
    }
}
