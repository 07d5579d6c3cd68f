//! Daily market commentary

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set};
use tracing::info;

use super::dto::{CreateMarketUpdateRequest, UpdateMarketUpdateRequest};
use crate::infrastructure::database::entities::market_update;
use crate::interfaces::http::common::{db_error, ApiError, ApiResponse, IdResponse, ValidatedJson};

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Market update not found")),
    )
}

#[utoipa::path(
    get,
    path = "/api/admin/market-updates",
    tag = "Market Updates",
    security(("admin_token" = [])),
    responses((status = 200, description = "Market updates, latest date first", body = Vec<market_update::Model>))
)]
pub async fn list_market_updates(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<market_update::Model>>, ApiError> {
    let items = market_update::Entity::find()
        .order_by_desc(market_update::Column::Date)
        .order_by_desc(market_update::Column::Id)
        .all(&db)
        .await
        .map_err(db_error)?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/admin/market-updates",
    tag = "Market Updates",
    security(("admin_token" = [])),
    request_body = CreateMarketUpdateRequest,
    responses(
        (status = 201, description = "Market update created", body = ApiResponse<market_update::Model>),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_market_update(
    State(db): State<DatabaseConnection>,
    ValidatedJson(request): ValidatedJson<CreateMarketUpdateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<market_update::Model>>), ApiError> {
    let now = Utc::now();
    let created = market_update::ActiveModel {
        date: Set(request.date.unwrap_or_else(|| now.date_naive())),
        text: Set(request.text),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(db_error)?;

    info!(market_update_id = created.id, "Market update created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    put,
    path = "/api/admin/market-updates/{id}",
    tag = "Market Updates",
    security(("admin_token" = [])),
    params(("id" = i32, Path, description = "Market update id")),
    request_body = UpdateMarketUpdateRequest,
    responses(
        (status = 200, description = "Market update changed", body = ApiResponse<market_update::Model>),
        (status = 404, description = "Market update not found")
    )
)]
pub async fn update_market_update(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateMarketUpdateRequest>,
) -> Result<Json<ApiResponse<market_update::Model>>, ApiError> {
    let current = market_update::Entity::find_by_id(id)
        .one(&db)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;

    let mut active = current.clone().into_active_model();
    if let Some(date) = request.date {
        active.date = Set(date);
    }
    if let Some(text) = request.text {
        active.text = Set(text);
    }
    if !active.is_changed() {
        return Ok(Json(ApiResponse::success(current)));
    }

    let updated = active.update(&db).await.map_err(db_error)?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/market-updates/{id}",
    tag = "Market Updates",
    security(("admin_token" = [])),
    params(("id" = i32, Path, description = "Market update id")),
    responses(
        (status = 200, description = "Market update deleted", body = ApiResponse<IdResponse>),
        (status = 404, description = "Market update not found")
    )
)]
pub async fn delete_market_update(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    let result = market_update::Entity::delete_by_id(id)
        .exec(&db)
        .await
        .map_err(db_error)?;
    if result.rows_affected == 0 {
        return Err(not_found());
    }
    Ok(Json(ApiResponse::success(IdResponse { id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::infrastructure::database::testing::test_db;

    #[tokio::test]
    async fn create_defaults_date_and_list_is_latest_first() {
        let db = test_db().await;
        let old = CreateMarketUpdateRequest {
            date: NaiveDate::from_ymd_opt(2024, 12, 1),
            text: "Kharif arrivals slow".to_string(),
        };
        let today = CreateMarketUpdateRequest { date: None, text: "Prices firm".to_string() };
        let (status, _) = create_market_update(State(db.clone()), ValidatedJson(old))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = create_market_update(State(db.clone()), ValidatedJson(today))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(items) = list_market_updates(State(db)).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "Prices firm");
        assert_eq!(items[0].date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn update_and_delete_by_id() {
        let db = test_db().await;
        let (_, Json(created)) = create_market_update(
            State(db.clone()),
            ValidatedJson(CreateMarketUpdateRequest { date: None, text: "draft".to_string() }),
        )
        .await
        .unwrap();
        let id = created.data.unwrap().id;

        let patch = UpdateMarketUpdateRequest { date: None, text: Some("final".to_string()) };
        let Json(updated) = update_market_update(State(db.clone()), Path(id), ValidatedJson(patch))
            .await
            .unwrap();
        assert_eq!(updated.data.unwrap().text, "final");

        let Json(deleted) = delete_market_update(State(db.clone()), Path(id)).await.unwrap();
        assert_eq!(deleted.data.unwrap().id, id);
        let err = delete_market_update(State(db), Path(id)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
