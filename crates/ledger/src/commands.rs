//! Command structs for ledger operations.
//!
//! These types group parameters for the write operations (post, internal
//! transfer, P2P transfer), keeping call sites readable and avoiding long
//! argument lists.

use uuid::Uuid;

use crate::Currency;

/// One proposed line of a journal entry.
#[derive(Clone, Debug)]
pub struct LineSpec {
    pub account_id: Uuid,
    /// Signed cents: positive credits, negative debits.
    pub amount_cents: i64,
    pub currency: Currency,
    pub memo: Option<String>,
}

impl LineSpec {
    #[must_use]
    pub fn new(account_id: Uuid, amount_cents: i64) -> Self {
        Self {
            account_id,
            amount_cents,
            currency: Currency::Usd,
            memo: None,
        }
    }

    #[must_use]
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Post a balanced journal entry directly.
///
/// This is the raw posting-engine surface; the transfer commands below build
/// one of these internally.
#[derive(Clone, Debug)]
pub struct PostEntryCmd {
    pub idempotency_token: String,
    pub description: Option<String>,
    pub initiated_by: Option<String>,
    pub lines: Vec<LineSpec>,
}

impl PostEntryCmd {
    #[must_use]
    pub fn new(idempotency_token: impl Into<String>, lines: Vec<LineSpec>) -> Self {
        Self {
            idempotency_token: idempotency_token.into(),
            description: None,
            initiated_by: None,
            lines,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn initiated_by(mut self, user_id: impl Into<String>) -> Self {
        self.initiated_by = Some(user_id.into());
        self
    }
}

/// Move money between two accounts of this institution.
#[derive(Clone, Debug)]
pub struct InternalTransferCmd {
    pub idempotency_token: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    /// Strictly positive cents.
    pub amount_cents: i64,
    pub description: Option<String>,
    pub initiated_by: Option<String>,
}

impl InternalTransferCmd {
    #[must_use]
    pub fn new(
        idempotency_token: impl Into<String>,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_cents: i64,
    ) -> Self {
        Self {
            idempotency_token: idempotency_token.into(),
            from_account_id,
            to_account_id,
            amount_cents,
            description: None,
            initiated_by: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn initiated_by(mut self, user_id: impl Into<String>) -> Self {
        self.initiated_by = Some(user_id.into());
        self
    }
}

/// Move money to another user, addressed by username.
///
/// The destination is the recipient's primary account: the earliest-created
/// account they own.
#[derive(Clone, Debug)]
pub struct P2pTransferCmd {
    pub idempotency_token: String,
    pub from_account_id: Uuid,
    pub to_username: String,
    /// Strictly positive cents.
    pub amount_cents: i64,
    pub description: Option<String>,
    pub initiated_by: Option<String>,
}

impl P2pTransferCmd {
    #[must_use]
    pub fn new(
        idempotency_token: impl Into<String>,
        from_account_id: Uuid,
        to_username: impl Into<String>,
        amount_cents: i64,
    ) -> Self {
        Self {
            idempotency_token: idempotency_token.into(),
            from_account_id,
            to_username: to_username.into(),
            amount_cents,
            description: None,
            initiated_by: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn initiated_by(mut self, user_id: impl Into<String>) -> Self {
        self.initiated_by = Some(user_id.into());
        self
    }
}
