//! Uploaded media references (images, banners, documents)

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    #[sea_orm(string_value = "IMAGE")]
    Image,
    #[sea_orm(string_value = "BANNER")]
    Banner,
    #[sea_orm(string_value = "DOC")]
    Doc,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "media_assets")]
#[serde(rename_all = "camelCase")]
#[schema(as = MediaAsset)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub kind: MediaKind,

    pub title: String,

    pub url: String,

    /// Free-form metadata supplied by the uploader
    #[sea_orm(nullable)]
    #[schema(value_type = Option<Object>)]
    pub meta: Option<Json>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
