//! # HTTP Routes
//!
//! ```text
//! GET  /health                          liveness + database check
//! GET  /api/menu                        cocktails with availability
//! POST /api/orders                      place an order
//! GET  /api/orders/active               staff queue
//! GET  /api/orders/mine                 caller's own orders
//! GET  /api/orders/{id}/events          audit trail (owner or staff)
//! POST /api/orders/{id}/status          move along the lifecycle (staff)
//! POST /api/orders/{id}/assign          set or clear assignee (staff)
//! POST /api/orders/{id}/cancel          cancel (owner or staff)
//! POST /api/products/{id}/stock         set or clear stock (staff)
//! POST /api/products/{id}/availability  manual switch (staff)
//! POST /api/cocktails/{id}/enabled      enable or disable (staff)
//! GET  /api/events                      server-sent events
//! GET  /api/flash                       read and clear flash messages
//! ```

mod events;
mod flash;
mod inventory;
mod orders;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/menu", get(inventory::menu))
        .route("/orders", post(orders::create))
        .route("/orders/active", get(orders::active))
        .route("/orders/mine", get(orders::mine))
        .route("/orders/{id}/events", get(orders::events))
        .route("/orders/{id}/status", post(orders::set_status))
        .route("/orders/{id}/assign", post(orders::assign))
        .route("/orders/{id}/cancel", post(orders::cancel))
        .route("/products/{id}/stock", post(inventory::set_stock))
        .route("/products/{id}/availability", post(inventory::set_availability))
        .route("/cocktails/{id}/enabled", post(inventory::set_enabled))
        .route("/events", get(events::stream))
        .route("/flash", get(flash::take));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await;
    let migrations = state.db.migration_status().await.ok();
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "database": database,
            "migrations": migrations.map(|(total, applied)| json!({"total": total, "applied": applied})),
            "subscribers": state.hub.subscriber_count(),
        })),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
