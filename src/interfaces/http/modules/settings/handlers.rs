//! Key/value site settings

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use tracing::{info, warn};

use super::dto::{PutSettingRequest, SettingDto};
use crate::infrastructure::database::entities::site_setting;
use crate::interfaces::http::common::{db_error, ApiError, ApiResponse, ValidatedJson};

type SettingsMap = BTreeMap<String, serde_json::Value>;

async fn load_settings(db: &DatabaseConnection) -> Result<SettingsMap, DbErr> {
    let rows = site_setting::Entity::find()
        .order_by_asc(site_setting::Column::Key)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
}

#[utoipa::path(
    get,
    path = "/api/admin/settings",
    tag = "Settings",
    security(("admin_token" = [])),
    responses((status = 200, description = "Settings as a key to value map", body = Object))
)]
pub async fn admin_settings(State(db): State<DatabaseConnection>) -> Result<Json<SettingsMap>, ApiError> {
    load_settings(&db).await.map(Json).map_err(db_error)
}

#[utoipa::path(
    put,
    path = "/api/admin/settings",
    tag = "Settings",
    security(("admin_token" = [])),
    request_body = PutSettingRequest,
    responses(
        (status = 200, description = "Setting stored", body = ApiResponse<SettingDto>),
        (status = 422, description = "Missing key")
    )
)]
pub async fn put_setting(
    State(db): State<DatabaseConnection>,
    ValidatedJson(request): ValidatedJson<PutSettingRequest>,
) -> Result<Json<ApiResponse<SettingDto>>, ApiError> {
    let row = site_setting::ActiveModel {
        key: Set(request.key.clone()),
        value: Set(request.value),
        updated_at: Set(Utc::now()),
    };
    site_setting::Entity::insert(row)
        .on_conflict(
            OnConflict::column(site_setting::Column::Key)
                .update_columns([site_setting::Column::Value, site_setting::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(&db)
        .await
        .map_err(db_error)?;

    let stored = site_setting::Entity::find_by_id(request.key.clone())
        .one(&db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| db_error(DbErr::RecordNotFound(request.key.clone())))?;

    info!(key = %stored.key, "Setting stored");
    Ok(Json(ApiResponse::success(SettingDto::from(stored))))
}

/// Same map as the admin view; `{}` when the table cannot be read.
#[utoipa::path(
    get,
    path = "/api/public/settings",
    tag = "Settings",
    responses((status = 200, description = "Settings as a key to value map", body = Object))
)]
pub async fn public_settings(State(db): State<DatabaseConnection>) -> Json<SettingsMap> {
    match load_settings(&db).await {
        Ok(map) => Json(map),
        Err(e) => {
            warn!(error = %e, "Public settings unavailable");
            Json(SettingsMap::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::testing::test_db;
    use serde_json::json;

    fn put(key: &str, value: serde_json::Value) -> ValidatedJson<PutSettingRequest> {
        ValidatedJson(PutSettingRequest { key: key.to_string(), value })
    }

    #[tokio::test]
    async fn put_upserts_by_key() {
        let db = test_db().await;
        for (key, value) in [("hero", json!({"title": "Fresh onions"})), ("phone", json!("+91 98"))] {
            let Json(saved) = put_setting(State(db.clone()), put(key, value)).await.unwrap();
            assert!(saved.success);
        }
        let Json(updated) = put_setting(State(db.clone()), put("hero", json!({"title": "Red onions"})))
            .await
            .unwrap();
        assert_eq!(updated.data.unwrap().value, json!({"title": "Red onions"}));

        let Json(map) = public_settings(State(db)).await;
        assert_eq!(map.len(), 2);
        assert_eq!(map["hero"], json!({"title": "Red onions"}));
        assert_eq!(map["phone"], json!("+91 98"));
    }

    #[tokio::test]
    async fn public_settings_fall_back_to_empty_map() {
        let db = test_db().await;
        db.clone().close().await.unwrap();
        let Json(map) = public_settings(State(db)).await;
        assert!(map.is_empty());
    }
}
