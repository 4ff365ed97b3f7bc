//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for the Veritas demo bank:
//!
//! - `users`: account owners (authentication lives elsewhere)
//! - `accounts`: customer bank accounts with frozen flag and daily limit
//! - `journal_entries`: atomic financial events, keyed by a unique
//!   idempotency token
//! - `ledger_lines`: signed per-account amounts belonging to an entry
//!
//! The unique index on `journal_entries.idempotency_token` is what makes the
//! posting protocol exactly-once: a concurrent duplicate insert loses at the
//! storage layer, never in application logic.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    FullName,
    Role,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    UserId,
    Kind,
    Frozen,
    DailyLimitCents,
    Currency,
    CreatedAt,
}

#[derive(Iden)]
enum JournalEntries {
    Table,
    Id,
    Description,
    IdempotencyToken,
    InitiatedBy,
    CreatedAt,
    PostedAt,
}

#[derive(Iden)]
enum LedgerLines {
    Table,
    Id,
    JournalEntryId,
    AccountId,
    AmountCents,
    Currency,
    Memo,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("USER"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::UserId).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::Frozen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::DailyLimitCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-user_id")
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-user_id-created_at")
                    .table(Accounts::Table)
                    .col(Accounts::UserId)
                    .col(Accounts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Journal entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(JournalEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JournalEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JournalEntries::Description).string())
                    .col(
                        ColumnDef::new(JournalEntries::IdempotencyToken)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JournalEntries::InitiatedBy).string())
                    .col(
                        ColumnDef::new(JournalEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JournalEntries::PostedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-journal_entries-idempotency_token")
                    .table(JournalEntries::Table)
                    .col(JournalEntries::IdempotencyToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-journal_entries-created_at")
                    .table(JournalEntries::Table)
                    .col(JournalEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Ledger lines
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerLines::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerLines::JournalEntryId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerLines::AccountId).string().not_null())
                    .col(
                        ColumnDef::new(LedgerLines::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerLines::Currency).string().not_null())
                    .col(ColumnDef::new(LedgerLines::Memo).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_lines-journal_entry_id")
                            .from(LedgerLines::Table, LedgerLines::JournalEntryId)
                            .to(JournalEntries::Table, JournalEntries::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_lines-account_id")
                            .from(LedgerLines::Table, LedgerLines::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_lines-account_id")
                    .table(LedgerLines::Table)
                    .col(LedgerLines::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_lines-journal_entry_id")
                    .table(LedgerLines::Table)
                    .col(LedgerLines::JournalEntryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
