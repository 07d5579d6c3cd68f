//! Onion rate entity

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RateType {
    #[sea_orm(string_value = "DOMESTIC")]
    Domestic,
    #[sea_orm(string_value = "EXPORT")]
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Quality {
    #[sea_orm(string_value = "LOW")]
    Low,
    #[sea_orm(string_value = "MEDIUM")]
    Medium,
    #[sea_orm(string_value = "HIGH")]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Packing {
    #[sea_orm(string_value = "LOOSE")]
    Loose,
    #[sea_orm(string_value = "BAG")]
    Bag,
    #[sea_orm(string_value = "BOX")]
    Box,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "onion_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub rate_type: RateType,

    /// Calendar day the price was observed
    pub date: NaiveDate,

    /// Set for DOMESTIC rows only
    #[sea_orm(nullable)]
    pub state_id: Option<i32>,

    #[sea_orm(nullable)]
    pub mandi_id: Option<i32>,

    /// Set for EXPORT rows only
    #[sea_orm(nullable)]
    pub country: Option<String>,

    pub quality: Quality,

    pub size_mm: i32,

    pub packing: Packing,

    #[sea_orm(nullable)]
    pub packing_description: Option<String>,

    #[sea_orm(column_type = "Double")]
    pub price_per_kg: f64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::state::Entity",
        from = "Column::StateId",
        to = "super::state::Column::Id"
    )]
    State,
    #[sea_orm(
        belongs_to = "super::mandi::Entity",
        from = "Column::MandiId",
        to = "super::mandi::Column::Id"
    )]
    Mandi,
}

impl Related<super::state::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::State.def()
    }
}

impl Related<super::mandi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mandi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
