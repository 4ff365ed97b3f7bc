//! Journal entry primitives.
//!
//! A `JournalEntry` is one atomic financial event, composed of two or more
//! balanced `LedgerLine`s. Entries are created together with their lines by
//! the posting engine and are immutable afterwards (financial audit trail).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::LedgerError;

use super::lines;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub description: Option<String>,
    /// Caller-supplied deduplication key; globally unique.
    pub idempotency_token: String,
    /// Initiating user (username), when known.
    pub initiated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `None` means pending. This core posts synchronously at creation, so a
    /// persisted entry always carries a posted timestamp; the field is the
    /// contract statements and exports rely on.
    pub posted_at: Option<DateTime<Utc>>,
    pub lines: Vec<lines::LedgerLine>,
}

impl JournalEntry {
    pub fn new(
        idempotency_token: String,
        description: Option<String>,
        initiated_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            idempotency_token,
            initiated_by,
            created_at: now,
            posted_at: Some(now),
            lines: Vec::new(),
        }
    }

    /// Returns `true` once the entry's effect is final and reflected in
    /// balance computations.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.posted_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: Option<String>,
    #[sea_orm(unique)]
    pub idempotency_token: String,
    pub initiated_by: Option<String>,
    pub created_at: DateTimeUtc,
    pub posted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lines::Entity")]
    Lines,
}

impl Related<super::lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&JournalEntry> for ActiveModel {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            description: ActiveValue::Set(entry.description.clone()),
            idempotency_token: ActiveValue::Set(entry.idempotency_token.clone()),
            initiated_by: ActiveValue::Set(entry.initiated_by.clone()),
            created_at: ActiveValue::Set(entry.created_at),
            posted_at: ActiveValue::Set(entry.posted_at),
        }
    }
}

impl TryFrom<Model> for JournalEntry {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::InvalidRequest("invalid entry id".to_string()))?,
            description: model.description,
            idempotency_token: model.idempotency_token,
            initiated_by: model.initiated_by,
            created_at: model.created_at,
            posted_at: model.posted_at,
            lines: Vec::new(),
        })
    }
}
