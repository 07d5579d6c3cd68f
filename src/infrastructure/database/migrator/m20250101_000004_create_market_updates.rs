use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MarketUpdates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MarketUpdates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MarketUpdates::Date).date().not_null())
                    .col(ColumnDef::new(MarketUpdates::Text).text().not_null())
                    .col(
                        ColumnDef::new(MarketUpdates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MarketUpdates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MarketUpdates {
    Table,
    Id,
    Date,
    Text,
    CreatedAt,
}
