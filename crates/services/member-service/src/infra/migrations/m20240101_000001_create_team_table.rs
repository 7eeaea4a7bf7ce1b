//! Migration: Create team table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Team::TeamId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Team::Name).string().not_null())
                    .col(ColumnDef::new(Team::CreatedDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Team::LastModifiedDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Team::CreatedBy).string().null())
                    .col(ColumnDef::new(Team::LastModifiedBy).string().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Team {
    Table,
    TeamId,
    Name,
    CreatedDate,
    LastModifiedDate,
    CreatedBy,
    LastModifiedBy,
}
