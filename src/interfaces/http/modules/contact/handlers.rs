//! Buyer enquiry form

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::infrastructure::database::entities::contact_inquiry;
use crate::interfaces::http::common::{db_error, ApiError, ApiResponse, IdResponse, ValidatedJson};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    #[serde(default)]
    #[validate(length(max = 120))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub mobile: String,
    /// Free text, e.g. "2 tonnes"
    #[serde(default)]
    #[validate(length(max = 120))]
    pub quantity: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Enquiry stored", body = ApiResponse<IdResponse>),
        (status = 400, description = "Name or mobile missing")
    )
)]
pub async fn submit_contact(
    State(db): State<DatabaseConnection>,
    ValidatedJson(request): ValidatedJson<ContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IdResponse>>), ApiError> {
    let name = request.name.trim();
    let mobile = request.mobile.trim();
    if name.is_empty() || mobile.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Name and mobile are required")),
        ));
    }
    let quantity = request
        .quantity
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(String::from);

    let stored = contact_inquiry::ActiveModel {
        name: Set(name.to_string()),
        mobile: Set(mobile.to_string()),
        quantity: Set(quantity),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(db_error)?;

    info!(inquiry_id = stored.id, "Contact enquiry received");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(IdResponse { id: stored.id }))))
}
