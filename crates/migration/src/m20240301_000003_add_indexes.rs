use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Entry: searches and balances are always scoped to a user
        manager
            .create_index(
                Index::create()
                    .name("idx_entry_user")
                    .table(Entry::Table)
                    .col(Entry::UserId)
                    .to_owned(),
            )
            .await?;

        // Entry: month/year listing per user
        manager
            .create_index(
                Index::create()
                    .name("idx_entry_user_period")
                    .table(Entry::Table)
                    .col(Entry::UserId)
                    .col(Entry::Year)
                    .col(Entry::Month)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_entry_user").table(Entry::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_entry_user_period").table(Entry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Entry { Table, UserId, Year, Month }
