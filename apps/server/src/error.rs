//! Error types for the Taproom server.
//!
//! ```text
//! DbError ──┐
//!           ├──► ServiceError ──► ApiError { code, message } ──► JSON + status
//! rules ────┘
//! ```
//!
//! | Code                 | Status |
//! |----------------------|--------|
//! | `VALIDATION_ERROR`   | 400    |
//! | `UNAUTHORIZED`       | 401    |
//! | `FORBIDDEN`          | 403    |
//! | `NOT_FOUND`          | 404    |
//! | `INVALID_TRANSITION` | 409    |
//! | `INTERNAL`           | 500    |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use taproom_core::{OrderStatus, ValidationError};
use taproom_db::DbError;

/// Service-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        ServiceError::Forbidden(reason.into())
    }
}

/// Lifts the rule failures the repositories raise inside their transactions.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation(e) => ServiceError::Validation(e),
            DbError::InvalidTransition { from, to } => ServiceError::InvalidTransition { from, to },
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::Database(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// What HTTP clients see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "An internal error occurred",
        )
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => {
                ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            e @ ServiceError::InvalidTransition { .. } => {
                ApiError::new(StatusCode::CONFLICT, "INVALID_TRANSITION", e.to_string())
            }
            e @ ServiceError::NotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }
            ServiceError::Forbidden(reason) => {
                ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", reason)
            }
            ServiceError::Database(e) => {
                // Details stay in the log
                tracing::error!(error = %e, "Database failure");
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
