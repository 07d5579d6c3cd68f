//! Create onion_rates table

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_locations::{Mandis, States};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OnionRates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OnionRates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OnionRates::RateType)
                            .string_len(16)
                            .not_null()
                            .default("DOMESTIC"),
                    )
                    .col(ColumnDef::new(OnionRates::Date).date().not_null())
                    .col(ColumnDef::new(OnionRates::StateId).integer())
                    .col(ColumnDef::new(OnionRates::MandiId).integer())
                    .col(ColumnDef::new(OnionRates::Country).string())
                    .col(ColumnDef::new(OnionRates::Quality).string_len(16).not_null())
                    .col(ColumnDef::new(OnionRates::SizeMm).integer().not_null())
                    .col(ColumnDef::new(OnionRates::Packing).string_len(16).not_null())
                    .col(ColumnDef::new(OnionRates::PackingDescription).string())
                    .col(ColumnDef::new(OnionRates::PricePerKg).double().not_null())
                    .col(
                        ColumnDef::new(OnionRates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OnionRates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_onion_rates_state")
                            .from(OnionRates::Table, OnionRates::StateId)
                            .to(States::Table, States::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_onion_rates_mandi")
                            .from(OnionRates::Table, OnionRates::MandiId)
                            .to(Mandis::Table, Mandis::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing and chart queries all filter or sort by day
        manager
            .create_index(
                Index::create()
                    .name("idx_onion_rates_date")
                    .table(OnionRates::Table)
                    .col(OnionRates::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_onion_rates_location")
                    .table(OnionRates::Table)
                    .col(OnionRates::StateId)
                    .col(OnionRates::MandiId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OnionRates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OnionRates {
    Table,
    Id,
    RateType,
    Date,
    StateId,
    MandiId,
    Country,
    Quality,
    SizeMm,
    Packing,
    PackingDescription,
    PricePerKg,
    CreatedAt,
    UpdatedAt,
}
