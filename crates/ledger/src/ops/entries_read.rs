//! Read side for statements and exports: an account's ledger lines joined
//! with their entry headers, newest first, with cursor-based pagination.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{Currency, LedgerError, ResultLedger, entries, lines};

use super::Ledger;

/// One line of an account's statement: the line amount plus its entry header.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountEntry {
    pub entry_id: Uuid,
    pub line_id: Uuid,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub currency: Currency,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
}

/// A page of statement lines, newest → older.
#[derive(Clone, Debug)]
pub struct EntryListPage {
    pub entries: Vec<AccountEntry>,
    /// Opaque cursor for the next (older) page, if any.
    pub next_cursor: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct EntriesCursor {
    created_at: DateTime<Utc>,
    line_id: String,
}

impl EntriesCursor {
    fn encode(&self) -> ResultLedger<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| LedgerError::InvalidRequest("invalid entries cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultLedger<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| LedgerError::InvalidRequest("invalid entries cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| LedgerError::InvalidRequest("invalid entries cursor".to_string()))
    }
}

impl Ledger {
    /// Lists an account's posted lines with their entry headers, paginated
    /// newest → older by `(entry created_at DESC, line id DESC)`.
    pub async fn account_entries_page(
        &self,
        account_id: Uuid,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultLedger<EntryListPage> {
        if limit == 0 || limit > 500 {
            return Err(LedgerError::InvalidRequest(
                "limit must be between 1 and 500".to_string(),
            ));
        }
        self.require_account(&self.database, account_id).await?;

        let mut query = lines::Entity::find()
            .find_also_related(entries::Entity)
            .filter(lines::Column::AccountId.eq(account_id.to_string()))
            .order_by_desc(entries::Column::CreatedAt)
            .order_by_desc(lines::Column::Id)
            .limit(limit + 1);

        if let Some(raw) = cursor {
            let cursor = EntriesCursor::decode(raw)?;
            query = query.filter(
                Condition::any()
                    .add(entries::Column::CreatedAt.lt(cursor.created_at))
                    .add(
                        Condition::all()
                            .add(entries::Column::CreatedAt.eq(cursor.created_at))
                            .add(lines::Column::Id.lt(cursor.line_id)),
                    ),
            );
        }

        let rows = query.all(&self.database).await?;
        let has_more = rows.len() as u64 > limit;

        let mut items = Vec::with_capacity(rows.len().min(limit as usize));
        for (line_model, entry_model) in rows.into_iter().take(limit as usize) {
            let entry_model = entry_model.ok_or_else(|| {
                LedgerError::InvalidRequest("line without parent entry".to_string())
            })?;
            items.push(AccountEntry {
                entry_id: Uuid::parse_str(&entry_model.id)
                    .map_err(|_| LedgerError::InvalidRequest("invalid entry id".to_string()))?,
                line_id: Uuid::parse_str(&line_model.id)
                    .map_err(|_| LedgerError::InvalidRequest("invalid line id".to_string()))?,
                description: entry_model.description,
                amount_cents: line_model.amount_cents,
                currency: Currency::try_from(line_model.currency.as_str())?,
                memo: line_model.memo,
                created_at: entry_model.created_at,
                posted_at: entry_model.posted_at,
            });
        }

        let next_cursor = if has_more {
            items.last().map_or(Ok(None), |last| {
                EntriesCursor {
                    created_at: last.created_at,
                    line_id: last.line_id.to_string(),
                }
                .encode()
                .map(Some)
            })?
        } else {
            None
        };

        Ok(EntryListPage {
            entries: items,
            next_cursor,
        })
    }
}
