//! # Taproom Server
//!
//! ```text
//! env ──► ServerConfig ──► Database (migrate) ──► AppState ──► axum::serve
//!                                                                  │
//!                                        Ctrl+C / SIGTERM ─────────┘ graceful
//! ```
//!
//! On the signal, event streams are told to close and in-flight requests
//! get [`SHUTDOWN_GRACE`] to finish before the process exits anyway.

use anyhow::Context;
use std::future::IntoFuture;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use taproom_db::{Database, DbConfig};
use taproom_server::{router, AppState, ServerConfig};

/// How long connections may drain after the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting Taproom server...");

    // Load configuration
    let config = ServerConfig::load().context("Invalid configuration")?;
    let addr = config.socket_addr()?;
    info!(
        %addr,
        database = %config.database_path.display(),
        "Configuration loaded"
    );

    // Connect to database, migrations included
    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("Database initialization failed")?;

    let state = AppState::new(db.clone(), config)?;
    let stopping = state.shutdown_signal();
    let app = router(state.clone());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            state.begin_shutdown();
        })
        .into_future();

    tokio::select! {
        result = server => result?,
        _ = grace_expired(stopping) => {
            warn!(grace = ?SHUTDOWN_GRACE, "Connections still open after grace period, exiting");
        }
    }

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves [`SHUTDOWN_GRACE`] after shutdown begins.
async fn grace_expired(mut stopping: watch::Receiver<bool>) {
    if stopping.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(SHUTDOWN_GRACE).await;
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
