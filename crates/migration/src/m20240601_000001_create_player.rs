//! Create `player` table.
//!
//! Usernames are unique across the table; `deleted_at` marks soft-deleted rows.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Player::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Player::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Player::Username, 100).unique_key().not_null())
                    .col(string_len(Player::Password, 255).not_null())
                    .col(
                        ColumnDef::new(Player::Balance)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp_with_time_zone(Player::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Player::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Player::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Player::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Player { Table, Id, Username, Password, Balance, CreatedAt, UpdatedAt, DeletedAt }
