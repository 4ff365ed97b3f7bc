use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "veritas={level},server={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    if let Some(server) = settings.server {
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = match parse_database(&server.database).await {
                Ok(db) => db,
                Err(err) => {
                    tracing::error!("failed to initialize database: {err}");
                    return;
                }
            };

            let timezone = match &server.timezone {
                Some(name) => match name.parse::<chrono_tz::Tz>() {
                    Ok(tz) => tz,
                    Err(err) => {
                        tracing::error!("invalid timezone {name}: {err}");
                        return;
                    }
                },
                None => chrono_tz::Tz::UTC,
            };

            let ledger = match ledger::Ledger::builder()
                .database(db.clone())
                .timezone(timezone)
                .build()
                .await
            {
                Ok(ledger) => ledger,
                Err(err) => {
                    tracing::error!("failed to build ledger from database: {err}");
                    return;
                }
            };

            let mut config = server::ServerConfig::default();
            if let Some(max_transfer_cents) = server.max_transfer_cents {
                config.max_transfer_cents = max_transfer_cents;
            }

            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(ledger, db, config, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
