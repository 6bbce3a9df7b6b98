//! Order routes.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use taproom_core::{NewOrder, Order, OrderEvent, OrderStatus};

use super::flash::with_flash;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::session::FlashMessage;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
    /// `null` clears the assignment.
    pub staff_id: Option<String>,
}

/// `POST /api/orders`
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
    Json(input): Json<NewOrder>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.create(&user, &input).await?;

    Ok(with_flash(
        &state,
        &headers,
        FlashMessage::success("Order placed"),
        (StatusCode::CREATED, Json(order)),
    ))
}

/// `GET /api/orders/active`
pub async fn active(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.active_orders(&user).await?))
}

/// `GET /api/orders/mine`
pub async fn mine(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.my_orders(&user).await?))
}

/// `GET /api/orders/{id}/events`
pub async fn events(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderEvent>>, ApiError> {
    Ok(Json(state.orders.history(&user, &id).await?))
}

/// `POST /api/orders/{id}/status`
pub async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.transition(&user, &id, body.status).await?;

    Ok(with_flash(
        &state,
        &headers,
        FlashMessage::info(format!("Order is now {}", order.status)),
        Json(order),
    ))
}

/// `POST /api/orders/{id}/assign`
pub async fn assign(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<AssignBody>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .orders
        .assign(&user, &id, body.staff_id.as_deref())
        .await?;

    let text = if order.assigned_staff_id.is_some() {
        "Order assigned"
    } else {
        "Order unassigned"
    };
    Ok(with_flash(&state, &headers, FlashMessage::info(text), Json(order)))
}

/// `POST /api/orders/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.cancel(&user, &id).await?;

    Ok(with_flash(
        &state,
        &headers,
        FlashMessage::info("Order cancelled"),
        Json(order),
    ))
}
