//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_team_table;
mod m20240101_000002_create_member_table;
mod m20240101_000003_create_item_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_team_table::Migration),
            Box::new(m20240101_000002_create_member_table::Migration),
            Box::new(m20240101_000003_create_item_table::Migration),
        ]
    }
}
