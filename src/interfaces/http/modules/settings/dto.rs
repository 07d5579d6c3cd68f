use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::infrastructure::database::entities::site_setting;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PutSettingRequest {
    #[validate(length(min = 1, max = 100, message = "key is required"))]
    pub key: String,
    /// Any JSON value
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingDto {
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl From<site_setting::Model> for SettingDto {
    fn from(m: site_setting::Model) -> Self {
        Self { key: m.key, value: m.value, updated_at: m.updated_at }
    }
}
