//! Transfer API endpoints.

use api_types::transfer::{InternalTransferNew, P2pTransferNew, TransferAccepted};
use axum::{Json, extract::State};
use axum_extra::TypedHeader;

use crate::{
    ServerError,
    server::{IdempotencyKey, ServerState},
};
use ledger::{InternalTransferCmd, P2pTransferCmd};

/// Configuration-level ceiling applied before the ledger pipeline runs.
fn check_ceiling(amount_cents: i64, state: &ServerState) -> Result<(), ServerError> {
    if amount_cents > state.config.max_transfer_cents {
        return Err(ServerError::Generic(
            "amount exceeds per-transfer maximum".to_string(),
        ));
    }
    Ok(())
}

pub async fn internal_new(
    State(state): State<ServerState>,
    TypedHeader(idempotency_key): TypedHeader<IdempotencyKey>,
    Json(payload): Json<InternalTransferNew>,
) -> Result<Json<TransferAccepted>, ServerError> {
    check_ceiling(payload.amount_cents, &state)?;

    let mut cmd = InternalTransferCmd::new(
        idempotency_key.0,
        payload.from_account_id,
        payload.to_account_id,
        payload.amount_cents,
    );
    cmd.description = payload.description;
    cmd.initiated_by = payload.initiated_by;

    let entry_id = state.ledger.transfer_internal(cmd).await?;
    Ok(Json(TransferAccepted { entry_id }))
}

pub async fn p2p_new(
    State(state): State<ServerState>,
    TypedHeader(idempotency_key): TypedHeader<IdempotencyKey>,
    Json(payload): Json<P2pTransferNew>,
) -> Result<Json<TransferAccepted>, ServerError> {
    check_ceiling(payload.amount_cents, &state)?;

    let mut cmd = P2pTransferCmd::new(
        idempotency_key.0,
        payload.from_account_id,
        payload.to_username,
        payload.amount_cents,
    );
    cmd.description = payload.description;
    cmd.initiated_by = payload.initiated_by;

    let entry_id = state.ledger.transfer_p2p(cmd).await?;
    Ok(Json(TransferAccepted { entry_id }))
}
