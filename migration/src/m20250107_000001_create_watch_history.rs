use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key on movie_id: a history row is written even when
        // caching the movie itself failed.
        manager
            .create_table(
                Table::create()
                    .table(WatchHistory::Table)
                    .if_not_exists()
                    .col(pk_auto(WatchHistory::Id))
                    .col(integer_null(WatchHistory::UserId))
                    .col(integer(WatchHistory::MovieId))
                    .col(big_integer(WatchHistory::WatchedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_history_movie_id")
                    .table(WatchHistory::Table)
                    .col(WatchHistory::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(WatchHistory::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum WatchHistory {
    Table,
    Id,
    UserId,
    MovieId,
    WatchedAt,
}
