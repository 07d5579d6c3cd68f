use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::location::{Mandi, State};
use crate::shared::serde_ext::empty_string_as_none;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MandiQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub state_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupMetadata {
    /// `database` or `fallback`
    pub source: String,
    /// e.g. `12ms`
    pub response_time: String,
    pub timestamp: DateTime<Utc>,
    pub count: usize,
    /// Echo of the `stateId` filter (mandis only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatesResponse {
    pub success: bool,
    pub data: Vec<State>,
    pub metadata: LookupMetadata,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MandisResponse {
    pub success: bool,
    pub data: Vec<Mandi>,
    pub metadata: LookupMetadata,
}
