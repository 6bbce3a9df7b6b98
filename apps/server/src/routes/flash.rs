//! Flash cookie plumbing for handlers.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use tracing::warn;

use crate::session::{clear_cookie, read_cookie, set_cookie, FlashMessage, FLASH_COOKIE};
use crate::AppState;

/// A response that also appends a flash message.
#[derive(Debug)]
pub struct WithFlash<T> {
    cookie: Option<String>,
    inner: T,
}

impl<T: IntoResponse> IntoResponse for WithFlash<T> {
    fn into_response(self) -> Response {
        let cookie = self.cookie.map(|c| (header::SET_COOKIE, c));
        (AppendHeaders(cookie), self.inner).into_response()
    }
}

/// Wraps `inner`, adding `message` to whatever the request's flash cookie
/// still carries. A flash that cannot be signed is logged and skipped.
pub fn with_flash<T>(
    state: &AppState,
    headers: &HeaderMap,
    message: FlashMessage,
    inner: T,
) -> WithFlash<T> {
    let existing = read_cookie(headers, FLASH_COOKIE);
    let cookie = match state.flashes.push(existing.as_deref(), message) {
        Ok(token) => Some(set_cookie(
            FLASH_COOKIE,
            &token,
            state.flashes.ttl_secs(),
            state.config.cookie_secure,
        )),
        Err(err) => {
            warn!(error = %err, "Flash not signed");
            None
        }
    };

    WithFlash { cookie, inner }
}

/// `GET /api/flash`: pending messages, then clears them.
pub async fn take(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let messages = read_cookie(&headers, FLASH_COOKIE)
        .map(|token| state.flashes.read(&token))
        .unwrap_or_default();

    (
        AppendHeaders([(
            header::SET_COOKIE,
            clear_cookie(FLASH_COOKIE, state.config.cookie_secure),
        )]),
        Json(messages),
    )
}
