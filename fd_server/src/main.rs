//! Flashcard review server.
//!
//! Serves the flashdeck REST API backed by PostgreSQL, or by an in-memory
//! store for local experiments.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use fd_server::{
    api,
    config::{Overrides, ServerConfig},
    logging, metrics,
};
use flashdeck::{AuthManager, Database, DeckManager, DeckRepository, MemoryStore, UserRepository};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run the flashdeck server

USAGE:
  fd_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/flashdeck]

FLAGS:
  --in-memory              Keep all data in process memory (lost on exit)
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (required, at least 32 characters)
  PASSWORD_PEPPER          Password hashing pepper (required, at least 16 characters)
  TOKEN_TTL_MINUTES        Access token lifetime [default: 60]
  METRICS_BIND             Prometheus scrape address (disabled when unset)
  DB_MAX_CONNECTIONS, DB_MIN_CONNECTIONS, DB_CONNECTION_TIMEOUT_SECS,
  DB_IDLE_TIMEOUT_SECS, DB_MAX_LIFETIME_SECS
                           Connection pool tuning
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let overrides = Overrides {
        in_memory: pargs.contains("--in-memory"),
        bind: pargs.opt_value_from_str::<_, SocketAddr>("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    let (users, decks, database) = if config.in_memory {
        info!("Using in-memory storage; data will not survive a restart");
        let store = Arc::new(MemoryStore::new());
        let users: Arc<dyn UserRepository> = store.clone();
        let decks: Arc<dyn DeckRepository> = store;
        (users, decks, None)
    } else {
        info!("Connecting to database");
        let db = Database::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.migrate().await.context("Failed to apply schema")?;
        info!("Database connected successfully");
        let users: Arc<dyn UserRepository> = Arc::new(db.users());
        let decks: Arc<dyn DeckRepository> = Arc::new(db.decks());
        (users, decks, Some(db))
    };

    let auth_manager = Arc::new(AuthManager::new(users, config.security.auth_config()?));
    let deck_manager = Arc::new(DeckManager::new(auth_manager.clone(), decks));

    let app = api::create_router(api::AppState {
        auth_manager,
        deck_manager,
        database: database.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
}
