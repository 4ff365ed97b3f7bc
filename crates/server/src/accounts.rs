//! Account read endpoints and the admin freeze toggle.
//!
//! The freeze handler is the account-management collaborator's write path;
//! it touches account rows directly and never goes anywhere near the
//! posting engine.

use api_types::account::{AccountKind as ApiKind, AccountView, BalanceResponse};
use api_types::admin::FreezeAccount;
use api_types::entry::{EntryList, EntryListResponse, EntryView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::FixedOffset;
use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use ledger::LedgerError;

fn map_kind(kind: ledger::AccountKind) -> ApiKind {
    match kind {
        ledger::AccountKind::Checking => ApiKind::Checking,
        ledger::AccountKind::Savings => ApiKind::Savings,
    }
}

fn map_currency(currency: ledger::Currency) -> api_types::Currency {
    match currency {
        ledger::Currency::Usd => api_types::Currency::Usd,
    }
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let overview = state.ledger.account_overview(id).await?;
    let account = overview.account;
    Ok(Json(AccountView {
        id: account.id,
        user_id: account.user_id,
        kind: map_kind(account.kind),
        frozen: account.frozen,
        daily_limit_cents: account.daily_limit_cents,
        currency: map_currency(account.currency),
        balance_cents: overview.balance_cents,
    }))
}

pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let balance_cents = state.ledger.balance(id).await?;
    Ok(Json(BalanceResponse {
        account_id: id,
        balance_cents,
        currency: api_types::Currency::Usd,
    }))
}

pub async fn entries(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(payload): Query<EntryList>,
) -> Result<Json<EntryListResponse>, ServerError> {
    let limit = payload.limit.unwrap_or(50);
    let page = state
        .ledger
        .account_entries_page(id, limit, payload.cursor.as_deref())
        .await?;

    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    let entries = page
        .entries
        .into_iter()
        .map(|item| EntryView {
            entry_id: item.entry_id,
            line_id: item.line_id,
            description: item.description,
            amount_cents: item.amount_cents,
            currency: api_types::Currency::Usd,
            memo: item.memo,
            created_at: item.created_at.with_timezone(&utc),
            posted_at: item.posted_at.map(|at| at.with_timezone(&utc)),
        })
        .collect();

    Ok(Json(EntryListResponse {
        entries,
        next_cursor: page.next_cursor,
    }))
}

pub async fn freeze(
    State(state): State<ServerState>,
    Json(payload): Json<FreezeAccount>,
) -> Result<StatusCode, ServerError> {
    if let Some(account) = ledger::accounts::Entity::find_by_id(payload.account_id.to_string())
        .one(&state.db)
        .await
        .map_err(LedgerError::from)?
    {
        let mut account: ledger::accounts::ActiveModel = account.into();
        account.frozen = ActiveValue::Set(payload.frozen);

        account.update(&state.db).await.map_err(LedgerError::from)?;
    } else {
        return Err(ServerError::Ledger(LedgerError::InvalidRequest(
            "account not exists".to_string(),
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
