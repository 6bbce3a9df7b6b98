//! Menu and inventory routes.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::flash::with_flash;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::services::MenuItem;
use crate::session::FlashMessage;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StockBody {
    /// `null` removes the counter.
    pub stock: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityBody {
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

/// `GET /api/menu`
pub async fn menu(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>, ApiError> {
    Ok(Json(state.inventory.menu().await?))
}

/// `POST /api/products/{id}/stock`
pub async fn set_stock(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<StockBody>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.inventory.set_stock(&user, &id, body.stock).await?;

    let text = format!("{} stock updated", product.product.name);
    Ok(with_flash(&state, &headers, FlashMessage::success(text), Json(product)))
}

/// `POST /api/products/{id}/availability`
pub async fn set_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<AvailabilityBody>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .inventory
        .set_available(&user, &id, body.available)
        .await?;

    let text = format!("{} availability updated", product.product.name);
    Ok(with_flash(&state, &headers, FlashMessage::success(text), Json(product)))
}

/// `POST /api/cocktails/{id}/enabled`
pub async fn set_enabled(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<EnabledBody>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .inventory
        .set_cocktail_enabled(&user, &id, body.enabled)
        .await?;

    let verb = if body.enabled { "enabled" } else { "disabled" };
    let text = format!("{} {verb}", item.cocktail.name);
    Ok(with_flash(&state, &headers, FlashMessage::success(text), Json(item)))
}
