//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_player;
mod m20240601_000002_add_player_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_player::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000002_add_player_indexes::Migration),
        ]
    }
}
