//! Identity extraction.
//!
//! ```text
//! Cookie: taproom_session=… ──► verify ──► users.get_by_id(sub) ──► CurrentUser
//!                                 │                 │
//!                                 └── absent ───────┴── unknown ──► 401
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::ops::Deref;
use taproom_core::User;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::session::{read_cookie, SESSION_COOKIE};
use crate::AppState;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = read_cookie(&parts.headers, SESSION_COOKIE)
            .ok_or_else(|| ApiError::unauthorized("Not signed in"))?;

        let claims = state
            .sessions
            .verify(&token)
            .ok_or_else(|| ApiError::unauthorized("Session is invalid or expired"))?;

        match state.db.users().get_by_id(&claims.sub).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                debug!(user_id = %claims.sub, "Session for unknown user");
                Err(ApiError::unauthorized("Session is invalid or expired"))
            }
            Err(err) => {
                error!(error = %err, "User lookup failed");
                Err(ApiError::internal())
            }
        }
    }
}
