//! The module contains the `Account` struct and its entity.
//!
//! An account is a customer-facing bank account. The ledger core never
//! mutates account rows; it only reads the `frozen` flag and
//! `daily_limit_cents` at decision time. Freezing and limit changes are done
//! by the account-management collaborators (admin CLI, admin endpoint).

use chrono::{DateTime, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, LedgerError};

/// Closed set of account kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountKind {
    Checking,
    Savings,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CHECKING" => Ok(Self::Checking),
            "SAVINGS" => Ok(Self::Savings),
            other => Err(LedgerError::InvalidRequest(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

/// A bank account as the ledger core sees it.
///
/// There is no balance field here: the balance is always derived from
/// posted ledger lines, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Owning user (username).
    pub user_id: String,
    pub kind: AccountKind,
    pub frozen: bool,
    pub daily_limit_cents: i64,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: String, kind: AccountKind, daily_limit_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            frozen: false,
            daily_limit_cents,
            currency: Currency::Usd,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub frozen: bool,
    pub daily_limit_cents: i64,
    pub currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lines::Entity")]
    Lines,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            user_id: ActiveValue::Set(account.user_id.clone()),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            frozen: ActiveValue::Set(account.frozen),
            daily_limit_cents: ActiveValue::Set(account.daily_limit_cents),
            currency: ActiveValue::Set(account.currency.code().to_string()),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::InvalidRequest("invalid account id".to_string()))?,
            user_id: model.user_id,
            kind: AccountKind::try_from(model.kind.as_str())?,
            frozen: model.frozen,
            daily_limit_cents: model.daily_limit_cents,
            currency: Currency::try_from(model.currency.as_str())?,
            created_at: model.created_at,
        })
    }
}
