use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::infrastructure::database::entities::media_asset::MediaKind;

fn default_kind() -> MediaKind {
    MediaKind::Image
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMediaRequest {
    #[serde(default = "default_kind")]
    pub kind: MediaKind,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(url(message = "url must be an absolute URL"))]
    pub url: String,
    #[schema(value_type = Option<Object>)]
    pub meta: Option<serde_json::Value>,
}
