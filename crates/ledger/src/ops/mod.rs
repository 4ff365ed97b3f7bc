use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{LedgerError, ResultLedger};

mod accounts;
mod balances;
mod entries_read;
mod posting;
mod store;
mod transfers;

pub use accounts::AccountOverview;
pub use entries_read::{AccountEntry, EntryListPage};

/// Run a block inside a DB transaction, committing on success and rolling
/// back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The ledger core: posting engine, aggregators and transfer orchestrator
/// over one shared database.
///
/// All writes to `journal_entries` and `ledger_lines` go through this struct;
/// that choke point is what makes the zero-sum invariant enforceable.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    /// Timezone used to evaluate the "calendar day" of the daily limit
    /// window.
    timezone: Tz,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    pub(crate) fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// The builder for `Ledger`.
pub struct LedgerBuilder {
    database: DatabaseConnection,
    timezone: Tz,
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            timezone: Tz::UTC,
        }
    }
}

impl LedgerBuilder {
    /// Pass the required database.
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Timezone for the daily-limit calendar window. Defaults to UTC.
    pub fn timezone(mut self, tz: Tz) -> LedgerBuilder {
        self.timezone = tz;
        self
    }

    /// Construct `Ledger`.
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
            timezone: self.timezone,
        })
    }
}

/// Validate and normalize a caller-supplied idempotency token.
///
/// Tokens are opaque strings of 8 to 200 characters; anything else is
/// rejected before any ledger logic runs.
pub(crate) fn validate_token(token: &str) -> ResultLedger<String> {
    let trimmed = token.trim();
    if trimmed.len() < 8 || trimmed.len() > 200 {
        return Err(LedgerError::InvalidRequest(
            "idempotency token must be 8 to 200 characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a transfer amount: strictly positive cents.
pub(crate) fn validate_transfer_amount(amount_cents: i64) -> ResultLedger<()> {
    if amount_cents <= 0 {
        return Err(LedgerError::InvalidRequest(
            "amount_cents must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Normalize a username for lookup: NFKC, trimmed, lowercase.
///
/// Usernames are 3 to 24 characters of `[a-z0-9_]`.
pub(crate) fn normalize_username(value: &str) -> ResultLedger<String> {
    let normalized: String = value.trim().nfkc().collect::<String>().to_lowercase();
    if normalized.len() < 3
        || normalized.len() > 24
        || !normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(LedgerError::InvalidRequest(
            "invalid username".to_string(),
        ));
    }
    Ok(normalized)
}

/// Closed bounds of the calendar day containing `as_of`, evaluated in `tz`
/// and returned in UTC: 00:00:00.000 to 23:59:59.999 of that day.
pub(crate) fn local_day_bounds(
    tz: Tz,
    as_of: DateTime<Utc>,
) -> ResultLedger<(DateTime<Utc>, DateTime<Utc>)> {
    let date = as_of.with_timezone(&tz).date_naive();
    let start_naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| LedgerError::InvalidRequest("invalid day start".to_string()))?;
    let end_naive = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| LedgerError::InvalidRequest("invalid day end".to_string()))?;

    // DST transitions can make a local midnight ambiguous or missing; take
    // the earliest/latest mapping so the window stays closed.
    let start = start_naive
        .and_local_timezone(tz)
        .earliest()
        .ok_or_else(|| LedgerError::InvalidRequest("invalid day start".to_string()))?;
    let end = end_naive
        .and_local_timezone(tz)
        .latest()
        .ok_or_else(|| LedgerError::InvalidRequest("invalid day end".to_string()))?;

    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn token_length_bounds() {
        assert!(validate_token("short").is_err());
        assert!(validate_token("12345678").is_ok());
        assert!(validate_token(&"x".repeat(200)).is_ok());
        assert!(validate_token(&"x".repeat(201)).is_err());
        assert_eq!(validate_token("  padded-token  ").unwrap(), "padded-token");
    }

    #[test]
    fn username_normalization() {
        assert_eq!(normalize_username(" Alice ").unwrap(), "alice");
        assert_eq!(normalize_username("bob_99").unwrap(), "bob_99");
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("has space").is_err());
    }

    #[test]
    fn day_bounds_in_utc() {
        let as_of = Utc.with_ymd_and_hms(2026, 3, 15, 13, 45, 0).unwrap();
        let (start, end) = local_day_bounds(Tz::UTC, as_of).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2026, 3, 15, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999)
        );
    }

    #[test]
    fn day_bounds_follow_timezone() {
        // 03:00 UTC on the 15th is still the 14th in New York.
        let as_of = Utc.with_ymd_and_hms(2026, 1, 15, 3, 0, 0).unwrap();
        let (start, _) = local_day_bounds(chrono_tz::America::New_York, as_of).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 14, 5, 0, 0).unwrap());
    }
}
