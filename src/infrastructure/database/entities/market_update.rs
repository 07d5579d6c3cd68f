use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "market_updates")]
#[serde(rename_all = "camelCase")]
#[schema(as = MarketUpdate)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub date: NaiveDate,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
