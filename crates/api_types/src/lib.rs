use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
}

pub mod transfer {
    use super::*;

    /// Request body for a transfer between two accounts of this bank.
    ///
    /// The idempotency token travels in the `idempotency-key` header, not in
    /// the body, so retried requests stay byte-identical.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct InternalTransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        /// Strictly positive cents.
        pub amount_cents: i64,
        pub description: Option<String>,
        pub initiated_by: Option<String>,
    }

    /// Request body for a transfer addressed to another user by username.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct P2pTransferNew {
        pub from_account_id: Uuid,
        pub to_username: String,
        /// Strictly positive cents.
        pub amount_cents: i64,
        pub description: Option<String>,
        pub initiated_by: Option<String>,
    }

    /// Response for an accepted (or idempotently replayed) transfer.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferAccepted {
        pub entry_id: Uuid,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum AccountKind {
        Checking,
        Savings,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub user_id: String,
        pub kind: AccountKind,
        pub frozen: bool,
        pub daily_limit_cents: i64,
        pub currency: Currency,
        /// Derived from posted lines, never stored.
        pub balance_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceResponse {
        pub account_id: Uuid,
        pub balance_cents: i64,
        pub currency: Currency,
    }
}

pub mod entry {
    use super::*;

    /// Query parameters for an account's statement lines.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryList {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    /// One statement line: a ledger line with its entry header.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub entry_id: Uuid,
        pub line_id: Uuid,
        pub description: Option<String>,
        pub amount_cents: i64,
        pub currency: Currency,
        pub memo: Option<String>,
        /// RFC3339 timestamp, including timezone offset.
        pub created_at: DateTime<FixedOffset>,
        pub posted_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListResponse {
        pub entries: Vec<EntryView>,
        pub next_cursor: Option<String>,
    }
}

pub mod admin {
    use super::*;

    /// Request body for the account-management freeze toggle.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FreezeAccount {
        pub account_id: Uuid,
        pub frozen: bool,
    }
}
