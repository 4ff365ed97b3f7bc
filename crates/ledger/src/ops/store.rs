//! Durable ledger storage: the atomic, idempotent entry insert and the
//! aggregation queries every policy check reads from.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{
    ConnectionTrait, DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
};

use crate::{
    JournalEntry, LedgerError, LedgerLine, PostEntryCmd, ResultLedger, entries, lines,
};

use super::Ledger;

impl Ledger {
    /// Create a posted journal entry and all its lines as one atomic unit.
    ///
    /// Replaying a previously-used token returns the existing entry
    /// unchanged. The race between two concurrent callers presenting the
    /// same token is closed by the unique index on
    /// `journal_entries.idempotency_token`: the loser's insert fails and the
    /// winner's entry is re-fetched and returned.
    pub(super) async fn create_entry_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &PostEntryCmd,
    ) -> ResultLedger<JournalEntry> {
        if cmd.lines.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "entry must have at least one line".to_string(),
            ));
        }

        let mut sum: i64 = 0;
        for line in &cmd.lines {
            if line.amount_cents == 0 {
                return Err(LedgerError::InvalidRequest(
                    "invalid line: amount_cents must not be 0".to_string(),
                ));
            }
            sum = sum.checked_add(line.amount_cents).ok_or_else(|| {
                LedgerError::InvalidRequest("line amounts overflow".to_string())
            })?;
        }
        if sum != 0 {
            return Err(LedgerError::UnbalancedEntry(format!(
                "line amounts sum to {sum}, expected 0"
            )));
        }

        // Idempotent replay: same token, same entry.
        if let Some(existing) = self
            .find_entry_by_token(db_tx, &cmd.idempotency_token)
            .await?
        {
            return Ok(existing);
        }

        let mut entry = JournalEntry::new(
            cmd.idempotency_token.clone(),
            cmd.description.clone(),
            cmd.initiated_by.clone(),
            Utc::now(),
        );
        for spec in &cmd.lines {
            let mut line = LedgerLine::new(
                entry.id,
                spec.account_id,
                spec.amount_cents,
                spec.currency,
            );
            line.memo = spec.memo.clone();
            entry.lines.push(line);
        }

        if let Err(err) = entries::ActiveModel::from(&entry).insert(db_tx).await {
            // Unique-token violation means a concurrent insert won; return
            // the winner's entry instead of failing the replay.
            if let Some(existing) = self
                .find_entry_by_token(db_tx, &cmd.idempotency_token)
                .await?
            {
                return Ok(existing);
            }
            return Err(err.into());
        }
        for line in &entry.lines {
            lines::ActiveModel::from(line).insert(db_tx).await?;
        }

        Ok(entry)
    }

    async fn find_entry_by_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        token: &str,
    ) -> ResultLedger<Option<JournalEntry>> {
        let Some(model) = entries::Entity::find()
            .filter(entries::Column::IdempotencyToken.eq(token.to_string()))
            .one(conn)
            .await?
        else {
            return Ok(None);
        };

        let mut entry = JournalEntry::try_from(model)?;
        let line_models = lines::Entity::find()
            .filter(lines::Column::JournalEntryId.eq(entry.id.to_string()))
            .order_by_asc(lines::Column::Id)
            .all(conn)
            .await?;
        entry.lines = line_models
            .into_iter()
            .map(LedgerLine::try_from)
            .collect::<ResultLedger<Vec<_>>>()?;

        Ok(Some(entry))
    }

    /// Sum of amounts over all lines of posted entries for the account.
    /// Returns 0 for an account with no activity.
    pub(super) async fn sum_posted_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: Uuid,
    ) -> ResultLedger<i64> {
        let total: Option<Option<i64>> = lines::Entity::find()
            .select_only()
            .column_as(lines::Column::AmountCents.sum(), "total")
            .join(JoinType::InnerJoin, lines::Relation::Entries.def())
            .filter(lines::Column::AccountId.eq(account_id.to_string()))
            .filter(entries::Column::PostedAt.is_not_null())
            .into_tuple()
            .one(conn)
            .await?;

        Ok(total.flatten().unwrap_or(0))
    }

    /// Absolute value of the sum of strictly-negative line amounts whose
    /// parent entry was created in the closed range `[start, end]`.
    pub(super) async fn sum_outgoing_in_range<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultLedger<i64> {
        let total: Option<Option<i64>> = lines::Entity::find()
            .select_only()
            .column_as(lines::Column::AmountCents.sum(), "total")
            .join(JoinType::InnerJoin, lines::Relation::Entries.def())
            .filter(lines::Column::AccountId.eq(account_id.to_string()))
            .filter(lines::Column::AmountCents.lt(0))
            .filter(entries::Column::CreatedAt.gte(start))
            .filter(entries::Column::CreatedAt.lte(end))
            .into_tuple()
            .one(conn)
            .await?;

        Ok(total.flatten().unwrap_or(0).abs())
    }
}
