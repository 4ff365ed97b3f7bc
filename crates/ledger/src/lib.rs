//! The double-entry ledger core of the Veritas demo bank.
//!
//! This crate records money movement, computes balances, and enforces
//! transfer policy (overdraft protection, per-account daily limits,
//! frozen-account blocking) under idempotent, exactly-once semantics.
//! Everything around it (HTTP surface, admin tooling, rendering) is thin
//! glue over this crate.

pub use accounts::{Account, AccountKind};
pub use commands::{InternalTransferCmd, LineSpec, P2pTransferCmd, PostEntryCmd};
pub use currency::Currency;
pub use entries::JournalEntry;
pub use error::LedgerError;
pub use lines::LedgerLine;
pub use money::MoneyCents;
pub use ops::{AccountEntry, AccountOverview, EntryListPage, Ledger, LedgerBuilder};

pub mod accounts;
mod commands;
mod currency;
pub mod entries;
mod error;
pub mod lines;
mod money;
mod ops;
pub mod users;

pub(crate) type ResultLedger<T> = Result<T, LedgerError>;
