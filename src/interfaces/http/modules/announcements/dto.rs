use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::infrastructure::database::entities::announcement;
use crate::shared::serde_ext::nullable;

fn check_window(
    start_at: Option<DateTime<Utc>>,
    end_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (start_at, end_at) {
        (Some(start), Some(end)) if start > end => {
            let mut err = ValidationError::new("window");
            err.message = Some("startAt must not be after endAt".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

fn validate_create_window(req: &CreateAnnouncementRequest) -> Result<(), ValidationError> {
    check_window(req.start_at, req.end_at)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_window"))]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "body is required"))]
    pub body: String,
    #[serde(default)]
    pub is_ticker: bool,
    #[serde(default)]
    pub published: bool,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

/// Absent fields are kept; `null` opens a window end.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: Option<String>,
    pub is_ticker: Option<bool>,
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub start_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub end_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateAnnouncementRequest {
    /// Window after applying this patch to `current`.
    pub fn resulting_window(
        &self,
        current: &announcement::Model,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ValidationError> {
        let start = self.start_at.unwrap_or(current.start_at);
        let end = self.end_at.unwrap_or(current.end_at);
        check_window(start, end).map(|_| (start, end))
    }
}

/// Public feed: every visible announcement, plus the ticker subset.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct PublicAnnouncements {
    pub items: Vec<announcement::Model>,
    pub ticker: Vec<announcement::Model>,
}
