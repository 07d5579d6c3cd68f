//! Create states and mandis, seeded with the two markets the site launched with

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(States::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(States::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(States::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Mandis::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Mandis::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Mandis::Name).string().not_null())
                    .col(ColumnDef::new(Mandis::StateId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mandis_state")
                            .from(Mandis::Table, Mandis::StateId)
                            .to(States::Table, States::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_mandis_name_state")
                    .table(Mandis::Table)
                    .col(Mandis::Name)
                    .col(Mandis::StateId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let states = Query::insert()
            .into_table(States::Table)
            .columns([States::Id, States::Name])
            .values_panic([1.into(), "Maharashtra".into()])
            .values_panic([2.into(), "Gujarat".into()])
            .to_owned();
        manager.exec_stmt(states).await?;

        let mandis = Query::insert()
            .into_table(Mandis::Table)
            .columns([Mandis::Id, Mandis::Name, Mandis::StateId])
            .values_panic([1.into(), "Lasalgaon".into(), 1.into()])
            .values_panic([2.into(), "Rajkot".into(), 2.into()])
            .to_owned();
        manager.exec_stmt(mandis).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Mandis::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(States::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum States {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub enum Mandis {
    Table,
    Id,
    Name,
    StateId,
}
