//! Bingo score server.
//!
//! Hosts account, score and leaderboard endpoints over a SQLite database.

use std::net::SocketAddr;

use anyhow::{Context, Error};
use bingo::{auth::AuthManager, db::Database};
use bingo_server::{api, config::ServerConfig, logging};
use pico_args::Arguments;
use std::sync::Arc;
use tracing::info;

const HELP: &str = "\
Run the bingo account and leaderboard server

USAGE:
  bingo_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:5000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or sqlite://bingo.db]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             SQLite connection string
  JWT_SECRET               JWT signing secret (required, 32+ chars)
  PASSWORD_PEPPER          Password hashing pepper (required, 16+ chars)
  LEADERBOARD_SIZE         Leaderboard entries returned [default: 10]
  SESSION_HOURS            Login session lifetime [default: 24]
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
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

    let bind: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("--bind must be an IP:PORT address")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url)?;
    info!("Starting bingo server at {}", config.bind);

    info!("Opening database: {}", config.database.database_url);
    let db = Database::new(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.database_url))?;
    db.migrate().await.context("Failed to apply migrations")?;
    info!("Database ready");

    let auth_manager = AuthManager::new(
        Arc::new(db.pool().clone()),
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    )
    .with_session_duration(chrono::Duration::hours(config.session_hours));

    match auth_manager.cleanup_expired_sessions().await {
        Ok(0) => {}
        Ok(n) => info!("Removed {n} expired session(s)"),
        Err(e) => tracing::warn!("Expired session cleanup failed: {e}"),
    }

    let state = api::AppState::new(db.clone(), auth_manager, config.leaderboard_size);
    let app = api::create_router(state);

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
    db.close().await;

    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server keeps
/// running until killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
}
