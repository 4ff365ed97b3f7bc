//! Read-side account lookups consumed by the transfer orchestrator and the
//! display surfaces. Account rows are mutated only by the account-management
//! collaborators; the core treats them as read-only inputs.

use uuid::Uuid;

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Account, LedgerError, ResultLedger, accounts, users};

use super::{Ledger, normalize_username, with_tx};

/// An account together with its derived balance.
#[derive(Clone, Debug)]
pub struct AccountOverview {
    pub account: Account,
    pub balance_cents: i64,
}

impl Ledger {
    pub(super) async fn require_account<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: Uuid,
    ) -> ResultLedger<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::InvalidRequest("account not exists".to_string()))?;
        Account::try_from(model)
    }

    /// Primary account of a user: the earliest-created account they own.
    pub(super) async fn primary_account_in_tx<C: ConnectionTrait>(
        &self,
        conn: &C,
        username: &str,
    ) -> ResultLedger<Account> {
        let username = normalize_username(username)?;
        users::Entity::find_by_id(username.clone())
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::InvalidRequest("recipient not exists".to_string()))?;

        let model = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(username))
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                LedgerError::InvalidRequest("recipient has no accounts".to_string())
            })?;
        Account::try_from(model)
    }

    /// Look up an account by id.
    pub async fn lookup_account(&self, account_id: Uuid) -> ResultLedger<Account> {
        self.require_account(&self.database, account_id).await
    }

    /// Resolve a username to their primary account.
    pub async fn primary_account_for_user(&self, username: &str) -> ResultLedger<Account> {
        self.primary_account_in_tx(&self.database, username).await
    }

    /// Account fields plus the derived balance, for display surfaces.
    pub async fn account_overview(&self, account_id: Uuid) -> ResultLedger<AccountOverview> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_id).await?;
            let balance_cents = self.sum_posted_lines(&db_tx, account_id).await?;
            Ok(AccountOverview {
                account,
                balance_cents,
            })
        })
    }

    /// All accounts owned by a user, oldest first.
    pub async fn accounts_for_user(&self, username: &str) -> ResultLedger<Vec<Account>> {
        let username = normalize_username(username)?;
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(username))
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }
}
