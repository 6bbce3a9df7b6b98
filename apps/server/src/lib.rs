//! # Taproom Server
//!
//! HTTP + SSE front for the drink ordering core.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Taproom Server                                │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  routes        │  │  services      │  │  session                   ││
//! │  │                │  │                │  │                            ││
//! │  │ • JSON API     │─►│ • OrderService │  │ • SessionManager           ││
//! │  │ • SSE stream   │  │ • Inventory    │  │ • FlashManager             ││
//! │  │ • flash cookie │  │                │  │   (codec: HMAC-SHA256)     ││
//! │  └───────┬────────┘  └───────┬────────┘  └────────────────────────────┘│
//! │          │                   │ publish after commit                     │
//! │          │                   ▼                                          │
//! │          │           ┌────────────────┐  ┌────────────────────────────┐│
//! │          └──────────►│ NotificationHub│  │  Database (SQLite)         ││
//! │        subscribe     └────────────────┘  └────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables, see [`config`].

pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod session;

use std::sync::Arc;

use taproom_db::Database;
use taproom_hub::NotificationHub;
use tokio::sync::watch;
use tracing::{info, warn};

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ServiceError, ServiceResult};
pub use routes::router;

use crate::codec::{CodecError, Signer};
use crate::services::{InventoryService, OrderService};
use crate::session::{FlashManager, SessionManager};

/// Shared application state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub hub: NotificationHub,
    pub sessions: SessionManager,
    pub flashes: FlashManager,
    pub config: Arc<ServerConfig>,
    pub orders: OrderService,
    pub inventory: InventoryService,
    /// Flips to `true` once; open event streams end when it does.
    shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    /// Wires services around a database and a fresh hub.
    ///
    /// Without a configured secret the signing key is random per process,
    /// so sessions and flashes do not survive a restart.
    pub fn new(db: Database, config: ServerConfig) -> Result<Self, CodecError> {
        let root = match &config.session_secret {
            Some(secret) => Signer::new(secret.as_bytes())?,
            None => {
                warn!("TAPROOM_SESSION_SECRET not set; using an ephemeral signing key");
                Signer::ephemeral()
            }
        };

        let hub = NotificationHub::new();

        Ok(AppState {
            sessions: SessionManager::new(root.derive("session")?, config.session_ttl_secs),
            flashes: FlashManager::new(root.derive("flash")?, config.flash_ttl_secs),
            orders: OrderService::new(db.clone(), hub.clone()),
            inventory: InventoryService::new(db.clone(), hub.clone()),
            config: Arc::new(config),
            shutdown: Arc::new(watch::channel(false).0),
            hub,
            db,
        })
    }

    /// Tells every open event stream to close. Idempotent.
    pub fn begin_shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            info!(streams = self.hub.subscriber_count(), "Closing event streams");
        }
    }

    /// Watch for [`begin_shutdown`](Self::begin_shutdown). Already `true`
    /// for receivers created after the fact.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}
