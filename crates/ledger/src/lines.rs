//! Ledger lines.
//!
//! A [`LedgerLine`] is a single account-scoped balance change applied as part
//! of a [`JournalEntry`](crate::JournalEntry).
//!
//! Amounts are signed integer **minor units** (cents for USD):
//! - positive values credit the account
//! - negative values debit the account
//!
//! Lines are created only with their parent entry and are never updated or
//! deleted (append-only). An account's balance is the sum of its posted
//! lines; there is no stored balance anywhere.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, LedgerError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub account_id: Uuid,
    pub amount_cents: i64,
    pub currency: Currency,
    pub memo: Option<String>,
}

impl LedgerLine {
    pub fn new(
        journal_entry_id: Uuid,
        account_id: Uuid,
        amount_cents: i64,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            journal_entry_id,
            account_id,
            amount_cents,
            currency,
            memo: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub journal_entry_id: String,
    pub account_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub memo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entries::Entity",
        from = "Column::JournalEntryId",
        to = "super::entries::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Entries,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerLine> for ActiveModel {
    fn from(line: &LedgerLine) -> Self {
        Self {
            id: ActiveValue::Set(line.id.to_string()),
            journal_entry_id: ActiveValue::Set(line.journal_entry_id.to_string()),
            account_id: ActiveValue::Set(line.account_id.to_string()),
            amount_cents: ActiveValue::Set(line.amount_cents),
            currency: ActiveValue::Set(line.currency.code().to_string()),
            memo: ActiveValue::Set(line.memo.clone()),
        }
    }
}

impl TryFrom<Model> for LedgerLine {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::InvalidRequest("invalid line id".to_string()))?,
            journal_entry_id: Uuid::parse_str(&model.journal_entry_id)
                .map_err(|_| LedgerError::InvalidRequest("invalid entry id".to_string()))?,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| LedgerError::InvalidRequest("invalid account id".to_string()))?,
            amount_cents: model.amount_cents,
            currency: Currency::try_from(model.currency.as_str())?,
            memo: model.memo,
        })
    }
}
