use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use serde::Serialize;
pub use server::{
    ServerConfig, ServerState, router, run, run_with_listener, spawn_with_listener,
};

mod accounts;
mod server;
mod transfers;

pub mod types {
    pub mod transfer {
        pub use api_types::transfer::{InternalTransferNew, P2pTransferNew, TransferAccepted};
    }

    pub mod account {
        pub use api_types::account::{AccountView, BalanceResponse};
    }

    pub mod entry {
        pub use api_types::entry::{EntryList, EntryListResponse, EntryView};
    }

    pub mod admin {
        pub use api_types::admin::FreezeAccount;
    }
}

pub enum ServerError {
    Ledger(LedgerError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        LedgerError::AccountBlocked(_) => StatusCode::FORBIDDEN,
        LedgerError::InsufficientFunds(_) => StatusCode::CONFLICT,
        LedgerError::DailyLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        LedgerError::UnbalancedEntry(_) => StatusCode::UNPROCESSABLE_ENTITY,
        // Transient storage failures are retryable with the same token.
        LedgerError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Storage(db_err) => {
            tracing::error!("storage error: {db_err}");
            "storage unavailable".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => {
                (status_for_ledger_error(&err), message_for_ledger_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_maps_to_400() {
        let res = ServerError::from(LedgerError::InvalidRequest("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn blocked_maps_to_403() {
        let res = ServerError::from(LedgerError::AccountBlocked("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn insufficient_funds_maps_to_409() {
        let res =
            ServerError::from(LedgerError::InsufficientFunds("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn daily_limit_maps_to_429() {
        let res =
            ServerError::from(LedgerError::DailyLimitExceeded("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn unbalanced_maps_to_422() {
        let res = ServerError::from(LedgerError::UnbalancedEntry("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
