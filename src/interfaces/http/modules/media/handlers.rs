use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::info;

use super::dto::CreateMediaRequest;
use crate::infrastructure::database::entities::media_asset;
use crate::interfaces::http::common::{db_error, ApiError, ApiResponse, ValidatedJson};

#[utoipa::path(
    get,
    path = "/api/admin/media",
    tag = "Media",
    security(("admin_token" = [])),
    responses((status = 200, description = "Media assets, newest first", body = Vec<media_asset::Model>))
)]
pub async fn list_media(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<media_asset::Model>>, ApiError> {
    let items = media_asset::Entity::find()
        .order_by_desc(media_asset::Column::CreatedAt)
        .order_by_desc(media_asset::Column::Id)
        .all(&db)
        .await
        .map_err(db_error)?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/admin/media",
    tag = "Media",
    security(("admin_token" = [])),
    request_body = CreateMediaRequest,
    responses(
        (status = 201, description = "Media asset recorded", body = ApiResponse<media_asset::Model>),
        (status = 422, description = "Missing title or invalid URL")
    )
)]
pub async fn create_media(
    State(db): State<DatabaseConnection>,
    ValidatedJson(request): ValidatedJson<CreateMediaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<media_asset::Model>>), ApiError> {
    let created = media_asset::ActiveModel {
        kind: Set(request.kind),
        title: Set(request.title),
        url: Set(request.url),
        meta: Set(request.meta),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(db_error)?;

    info!(media_id = created.id, kind = ?created.kind, "Media asset recorded");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
