use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::serde_ext::optional_flexible_date;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMarketUpdateRequest {
    /// Defaults to today (UTC)
    #[serde(default, deserialize_with = "optional_flexible_date")]
    #[schema(value_type = Option<String>, example = "2025-05-01")]
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "text is required"))]
    pub text: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMarketUpdateRequest {
    #[serde(default, deserialize_with = "optional_flexible_date")]
    #[schema(value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: Option<String>,
}
