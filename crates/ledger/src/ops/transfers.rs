//! The transfer orchestrator: turns a user-facing transfer request into a
//! validated, balanced posting.
//!
//! Checks run in a fixed order and short-circuit on the first failure:
//! resolve accounts, frozen flag, sufficient funds, daily limit, post.
//! Callers rely on this order to interpret the returned reason (a frozen
//! account is always reported before an insufficient balance, even when both
//! hold). The whole sequence runs inside one database transaction; the
//! unique idempotency token remains the backstop for replays.

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::{
    Account, InternalTransferCmd, LedgerError, LineSpec, P2pTransferCmd, PostEntryCmd,
    ResultLedger,
};

use super::{Ledger, local_day_bounds, validate_token, validate_transfer_amount, with_tx};

impl Ledger {
    /// Transfer between two accounts of this institution.
    ///
    /// Returns the id of the journal entry recording the movement. Replaying
    /// the same idempotency token returns the original entry's id without
    /// moving money again.
    pub async fn transfer_internal(&self, cmd: InternalTransferCmd) -> ResultLedger<Uuid> {
        let token = validate_token(&cmd.idempotency_token)?;
        validate_transfer_amount(cmd.amount_cents)?;
        if cmd.from_account_id == cmd.to_account_id {
            return Err(LedgerError::InvalidRequest(
                "source and destination must differ".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let from = self.require_account(&db_tx, cmd.from_account_id).await?;
            let to = self.require_account(&db_tx, cmd.to_account_id).await?;

            let description = cmd
                .description
                .clone()
                .unwrap_or_else(|| "internal transfer".to_string());
            let entry_id = self
                .checked_transfer(
                    &db_tx,
                    &from,
                    &to,
                    cmd.amount_cents,
                    token,
                    description,
                    cmd.initiated_by.clone(),
                )
                .await?;
            Ok(entry_id)
        })
    }

    /// Transfer to another user's primary account, addressed by username.
    pub async fn transfer_p2p(&self, cmd: P2pTransferCmd) -> ResultLedger<Uuid> {
        let token = validate_token(&cmd.idempotency_token)?;
        validate_transfer_amount(cmd.amount_cents)?;

        with_tx!(self, |db_tx| {
            let from = self.require_account(&db_tx, cmd.from_account_id).await?;
            let to = self
                .primary_account_in_tx(&db_tx, &cmd.to_username)
                .await?;

            let description = cmd
                .description
                .clone()
                .unwrap_or_else(|| format!("p2p to @{}", cmd.to_username.trim()));
            let entry_id = self
                .checked_transfer(
                    &db_tx,
                    &from,
                    &to,
                    cmd.amount_cents,
                    token,
                    description,
                    cmd.initiated_by.clone(),
                )
                .await?;
            Ok(entry_id)
        })
    }

    /// Shared tail of the pipeline: frozen check, funds check, daily-limit
    /// check, then the balanced two-line posting.
    async fn checked_transfer(
        &self,
        db_tx: &DatabaseTransaction,
        from: &Account,
        to: &Account,
        amount_cents: i64,
        token: String,
        description: String,
        initiated_by: Option<String>,
    ) -> ResultLedger<Uuid> {
        // Frozen accounts are reported before any balance read so a blocked
        // account leaks nothing about its funds.
        if from.frozen || to.frozen {
            let blocked = if from.frozen { from.id } else { to.id };
            return Err(LedgerError::AccountBlocked(format!(
                "account {blocked} is frozen"
            )));
        }

        let balance = self.sum_posted_lines(db_tx, from.id).await?;
        if balance - amount_cents < 0 {
            return Err(LedgerError::InsufficientFunds(format!(
                "balance {balance} cannot cover {amount_cents}"
            )));
        }

        let (start, end) = local_day_bounds(self.timezone(), Utc::now())?;
        let today_outgoing = self
            .sum_outgoing_in_range(db_tx, from.id, start, end)
            .await?;
        if today_outgoing + amount_cents > from.daily_limit_cents {
            return Err(LedgerError::DailyLimitExceeded(format!(
                "today's outgoing {today_outgoing} plus {amount_cents} exceeds limit {}",
                from.daily_limit_cents
            )));
        }

        let mut cmd = PostEntryCmd::new(
            token,
            vec![
                LineSpec::new(from.id, -amount_cents),
                LineSpec::new(to.id, amount_cents),
            ],
        )
        .description(description);
        cmd.initiated_by = initiated_by;

        let entry = self.create_entry_in_tx(db_tx, &cmd).await?;
        Ok(entry.id)
    }
}
