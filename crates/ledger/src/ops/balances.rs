//! Derived, point-in-time financial facts.
//!
//! Balances are never stored: every read aggregates the posted lines, so
//! policy decisions always see the latest committed state.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::TransactionTrait;

use crate::ResultLedger;

use super::{Ledger, local_day_bounds, with_tx};

impl Ledger {
    /// Posted balance of an account, in cents.
    ///
    /// Uncached: callers deciding transfer policy must see the latest
    /// committed state.
    pub async fn balance(&self, account_id: Uuid) -> ResultLedger<i64> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id).await?;
            let balance = self.sum_posted_lines(&db_tx, account_id).await?;
            Ok(balance)
        })
    }

    /// Total outgoing (debited) cents for the calendar day containing
    /// `as_of`, evaluated in the ledger's configured timezone.
    ///
    /// Always non-negative.
    pub async fn today_outgoing(
        &self,
        account_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> ResultLedger<i64> {
        let (start, end) = local_day_bounds(self.timezone(), as_of)?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id).await?;
            let outgoing = self
                .sum_outgoing_in_range(&db_tx, account_id, start, end)
                .await?;
            Ok(outgoing)
        })
    }
}
