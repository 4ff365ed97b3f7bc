//! The posting engine: the sole path by which money enters or leaves the
//! ledger.

use sea_orm::TransactionTrait;

use crate::{JournalEntry, PostEntryCmd, ResultLedger};

use super::{Ledger, validate_token, with_tx};

impl Ledger {
    /// Validate and atomically commit a balanced journal entry.
    ///
    /// Entries are posted synchronously: the posted timestamp is set at
    /// creation time, there is no separate settlement phase. Calling `post`
    /// twice with the same token returns the same entry both times and
    /// leaves exactly one set of lines in storage.
    pub async fn post(&self, mut cmd: PostEntryCmd) -> ResultLedger<JournalEntry> {
        cmd.idempotency_token = validate_token(&cmd.idempotency_token)?;
        with_tx!(self, |db_tx| {
            let entry = self.create_entry_in_tx(&db_tx, &cmd).await?;
            Ok(entry)
        })
    }
}
