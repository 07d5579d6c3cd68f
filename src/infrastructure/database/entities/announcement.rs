//! Announcement entity (site notices and the scrolling ticker)

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "announcements")]
#[serde(rename_all = "camelCase")]
#[schema(as = Announcement)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Shown in the ticker strip instead of the notice list
    pub is_ticker: bool,

    pub published: bool,

    /// Visibility window; either end may be open
    #[sea_orm(nullable)]
    pub start_at: Option<DateTime<Utc>>,

    #[sea_orm(nullable)]
    pub end_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.published
            && self.start_at.map_or(true, |start| start <= now)
            && self.end_at.map_or(true, |end| now <= end)
    }
}
