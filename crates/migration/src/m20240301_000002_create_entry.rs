//! Create `entry` table with FK to `user`.
//!
//! `kind` and `status` hold the wire spellings (`RECEITA`, `PENDENTE`, ...).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entry::Table)
                    .if_not_exists()
                    .col(big_integer(Entry::Id).auto_increment().primary_key())
                    .col(text(Entry::Description).not_null())
                    .col(integer(Entry::Month).not_null())
                    .col(integer(Entry::Year).not_null())
                    .col(big_integer(Entry::UserId).not_null())
                    .col(decimal_len(Entry::Value, 16, 2).not_null())
                    .col(string_len(Entry::Kind, 20).not_null())
                    .col(string_len(Entry::Status, 20).not_null())
                    .col(date(Entry::RegisteredAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entry_user")
                            .from(Entry::Table, Entry::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Entry::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Entry { Table, Id, Description, Month, Year, UserId, Value, Kind, Status, RegisteredAt }

#[derive(DeriveIden)]
enum User { Table, Id }
