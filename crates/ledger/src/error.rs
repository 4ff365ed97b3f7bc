//! The module contains the errors the ledger core can throw.
//!
//! The variants mirror the transfer pipeline: a request is either rejected
//! before any write ([`InvalidRequest`], [`AccountBlocked`],
//! [`InsufficientFunds`], [`DailyLimitExceeded`], [`UnbalancedEntry`]) or
//! fails at the storage layer ([`Storage`], retryable).
//!
//! [`InvalidRequest`]: LedgerError::InvalidRequest
//! [`AccountBlocked`]: LedgerError::AccountBlocked
//! [`InsufficientFunds`]: LedgerError::InsufficientFunds
//! [`DailyLimitExceeded`]: LedgerError::DailyLimitExceeded
//! [`UnbalancedEntry`]: LedgerError::UnbalancedEntry
//! [`Storage`]: LedgerError::Storage
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Malformed input: bad idempotency token, non-positive amount,
    /// same source/destination, unresolved account or username.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The lines of a proposed entry do not sum to zero.
    #[error("Unbalanced entry: {0}")]
    UnbalancedEntry(String),
    /// Source or destination account is frozen.
    #[error("Account blocked: {0}")]
    AccountBlocked(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Daily limit exceeded: {0}")]
    DailyLimitExceeded(String),
    /// Underlying storage failure; safe to retry with the same token.
    #[error(transparent)]
    Storage(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidRequest(a), Self::InvalidRequest(b)) => a == b,
            (Self::UnbalancedEntry(a), Self::UnbalancedEntry(b)) => a == b,
            (Self::AccountBlocked(a), Self::AccountBlocked(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::DailyLimitExceeded(a), Self::DailyLimitExceeded(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
