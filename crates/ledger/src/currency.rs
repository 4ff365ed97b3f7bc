use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// ISO-like currency code carried by every ledger line.
///
/// The bank is effectively mono-currency (`USD`), but the data model keeps the
/// code explicit so statements and exports never have to guess.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// `MoneyCents`). `minor_units()` returns how many decimal digits separate
/// major units (human input/output, e.g. `10.50 USD`) from the stored
/// integers (e.g. `1050`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Usd => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            other => Err(LedgerError::InvalidRequest(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
