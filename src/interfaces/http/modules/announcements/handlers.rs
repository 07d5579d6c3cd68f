//! Announcement management and the public notice feed

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use tracing::{info, warn};

use super::dto::{CreateAnnouncementRequest, PublicAnnouncements, UpdateAnnouncementRequest};
use crate::infrastructure::database::entities::announcement;
use crate::interfaces::http::common::{db_error, ApiError, ApiResponse, IdResponse, ValidatedJson};

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Announcement not found")),
    )
}

#[utoipa::path(
    get,
    path = "/api/admin/announcements",
    tag = "Announcements",
    security(("admin_token" = [])),
    responses((status = 200, description = "All announcements, newest first", body = Vec<announcement::Model>))
)]
pub async fn list_announcements(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<announcement::Model>>, ApiError> {
    let items = announcement::Entity::find()
        .order_by_desc(announcement::Column::CreatedAt)
        .order_by_desc(announcement::Column::Id)
        .all(&db)
        .await
        .map_err(db_error)?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/admin/announcements",
    tag = "Announcements",
    security(("admin_token" = [])),
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement created", body = ApiResponse<announcement::Model>),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_announcement(
    State(db): State<DatabaseConnection>,
    ValidatedJson(request): ValidatedJson<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<announcement::Model>>), ApiError> {
    let now = Utc::now();
    let created = announcement::ActiveModel {
        title: Set(request.title.trim().to_string()),
        body: Set(request.body),
        is_ticker: Set(request.is_ticker),
        published: Set(request.published),
        start_at: Set(request.start_at),
        end_at: Set(request.end_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(db_error)?;

    info!(announcement_id = created.id, "Announcement created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    put,
    path = "/api/admin/announcements/{id}",
    tag = "Announcements",
    security(("admin_token" = [])),
    params(("id" = i32, Path, description = "Announcement id")),
    request_body = UpdateAnnouncementRequest,
    responses(
        (status = 200, description = "Announcement updated", body = ApiResponse<announcement::Model>),
        (status = 400, description = "Window would start after it ends"),
        (status = 404, description = "Announcement not found")
    )
)]
pub async fn update_announcement(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateAnnouncementRequest>,
) -> Result<Json<ApiResponse<announcement::Model>>, ApiError> {
    let current = announcement::Entity::find_by_id(id)
        .one(&db)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;

    let (start_at, end_at) = request.resulting_window(&current).map_err(|e| {
        let message = e.message.map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string());
        (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
    })?;

    let mut active = current.into_active_model();
    if let Some(title) = request.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(body) = request.body {
        active.body = Set(body);
    }
    if let Some(is_ticker) = request.is_ticker {
        active.is_ticker = Set(is_ticker);
    }
    if let Some(published) = request.published {
        active.published = Set(published);
    }
    active.start_at = Set(start_at);
    active.end_at = Set(end_at);
    active.updated_at = Set(Utc::now());

    let updated = active.update(&db).await.map_err(db_error)?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/announcements/{id}",
    tag = "Announcements",
    security(("admin_token" = [])),
    params(("id" = i32, Path, description = "Announcement id")),
    responses(
        (status = 200, description = "Announcement deleted", body = ApiResponse<IdResponse>),
        (status = 404, description = "Announcement not found")
    )
)]
pub async fn delete_announcement(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    let result = announcement::Entity::delete_by_id(id)
        .exec(&db)
        .await
        .map_err(db_error)?;
    if result.rows_affected == 0 {
        return Err(not_found());
    }
    info!(announcement_id = id, "Announcement deleted");
    Ok(Json(ApiResponse::success(IdResponse { id })))
}

/// Published announcements whose window contains now. Ticker entries sort
/// after regular notices. Database failures degrade to empty lists.
#[utoipa::path(
    get,
    path = "/api/public/announcements",
    tag = "Announcements",
    responses((status = 200, description = "Visible announcements and ticker entries", body = PublicAnnouncements))
)]
pub async fn public_announcements(State(db): State<DatabaseConnection>) -> Json<PublicAnnouncements> {
    let now = Utc::now();
    let visible = announcement::Entity::find()
        .filter(announcement::Column::Published.eq(true))
        .filter(
            Condition::any()
                .add(announcement::Column::StartAt.is_null())
                .add(announcement::Column::StartAt.lte(now)),
        )
        .filter(
            Condition::any()
                .add(announcement::Column::EndAt.is_null())
                .add(announcement::Column::EndAt.gte(now)),
        )
        .order_by_asc(announcement::Column::IsTicker)
        .order_by_desc(announcement::Column::Id)
        .all(&db)
        .await;

    match visible {
        Ok(items) => {
            let ticker = items.iter().filter(|a| a.is_ticker).cloned().collect();
            Json(PublicAnnouncements { items, ticker })
        }
        Err(e) => {
            warn!(error = %e, "Public announcements unavailable");
            Json(PublicAnnouncements::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::infrastructure::database::testing::test_db;

    fn request(title: &str, is_ticker: bool, published: bool) -> CreateAnnouncementRequest {
        CreateAnnouncementRequest {
            title: title.to_string(),
            body: "Arrivals up 20% at Lasalgaon".to_string(),
            is_ticker,
            published,
            start_at: None,
            end_at: None,
        }
    }

    #[tokio::test]
    async fn public_feed_only_shows_published_rows_inside_their_window() {
        let db = test_db().await;
        let mut expired = request("expired", false, true);
        expired.end_at = Some(Utc::now() - Duration::days(1));
        for req in [
            request("notice", false, true),
            request("ticker", true, true),
            request("draft", false, false),
            expired,
        ] {
            let (status, _) = create_announcement(State(db.clone()), ValidatedJson(req))
                .await
                .unwrap();
            assert_eq!(status, StatusCode::CREATED);
        }

        let Json(feed) = public_announcements(State(db)).await;
        let titles: Vec<_> = feed.items.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["notice", "ticker"]);
        assert_eq!(feed.ticker.len(), 1);
        assert_eq!(feed.ticker[0].title, "ticker");
    }

    #[tokio::test]
    async fn update_rejects_inverted_window_and_missing_rows() {
        let db = test_db().await;
        let (_, Json(created)) =
            create_announcement(State(db.clone()), ValidatedJson(request("notice", false, true)))
                .await
                .unwrap();
        let id = created.data.unwrap().id;

        let patch = UpdateAnnouncementRequest {
            start_at: Some(Some(Utc::now())),
            end_at: Some(Some(Utc::now() - Duration::days(2))),
            ..Default::default()
        };
        let err = update_announcement(State(db.clone()), Path(id), ValidatedJson(patch))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let err = update_announcement(
            State(db.clone()),
            Path(id + 100),
            ValidatedJson(UpdateAnnouncementRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let err = delete_announcement(State(db), Path(id + 100)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn public_feed_degrades_to_empty_lists() {
        let db = test_db().await;
        db.clone().close().await.unwrap();
        let Json(feed) = public_announcements(State(db)).await;
        assert!(feed.items.is_empty() && feed.ticker.is_empty());
    }
}
