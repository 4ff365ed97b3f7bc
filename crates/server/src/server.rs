use axum::{
    Router,
    routing::{get, post},
};
use axum_extra::headers::{Error as AxumError, Header};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{accounts, transfers};
use ledger::Ledger;

static IDEMPOTENCY_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("idempotency-key");

/// Per-transfer configuration guards applied before the ledger pipeline runs.
#[derive(Clone, Copy, Debug)]
pub struct ServerConfig {
    /// Hard ceiling on a single transfer, in cents. Default $10M.
    pub max_transfer_cents: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_transfer_cents: 10_000_000_00,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub db: DatabaseConnection,
    pub config: ServerConfig,
}

/// `TypedHeader` for the caller-supplied idempotency token.
///
/// Every mutating request must carry an `idempotency-key` entry in the
/// header; the ledger rejects tokens outside 8..=200 characters.
#[derive(Debug)]
pub struct IdempotencyKey(pub String);

impl Header for IdempotencyKey {
    fn name() -> &'static axum::http::HeaderName {
        &IDEMPOTENCY_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };

        Ok(IdempotencyKey(value.trim().to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode idempotency-key header"),
        }
    }
}

/// Build the application router. Exposed so tests can drive the service
/// without binding a socket.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(accounts::health))
        .route("/transfers/internal", post(transfers::internal_new))
        .route("/transfers/p2p", post(transfers::p2p_new))
        .route("/accounts/{id}", get(accounts::get))
        .route("/accounts/{id}/balance", get(accounts::balance))
        .route("/accounts/{id}/entries", get(accounts::entries))
        .route("/admin/accounts/freeze", post(accounts::freeze))
        .with_state(state)
}

pub async fn run(ledger: Ledger, db: DatabaseConnection, config: ServerConfig) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, db, config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
        db,
        config,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, db, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
