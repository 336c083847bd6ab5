use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Player: lookups filter on deleted_at IS NULL
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_player_deleted_at")
                    .table(Player::Table)
                    .col(Player::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_player_deleted_at").table(Player::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Player { Table, DeletedAt }
