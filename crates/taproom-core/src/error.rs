//! # Error Types
//!
//! Domain-specific error types for taproom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  taproom-core errors (this file)                                       │
//! │  ├── CoreError        - Lifecycle and lookup failures                  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  taproom-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  server errors (in app)                                                │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError → Client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recovery
//! Every variant here is recovered at the call boundary. None of them is an
//! unexpected failure and none is logged above `debug`.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested status is not reachable from the current one.
    ///
    /// ## When This Occurs
    /// - Skipping a step (`PLACED → READY`)
    /// - Any move out of `DELIVERED` or `CANCELLED`
    /// - A concurrent writer moved the order first
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Entity cannot be found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors are user-correctable: the caller fixes the input and retries.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The cocktail has been switched off by staff.
    #[error("{name} is not on the menu right now")]
    CocktailDisabled { name: String },

    /// A required ingredient of the cocktail is out.
    #[error("{name} is currently unavailable")]
    CocktailUnavailable { name: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = CoreError::InvalidTransition {
            from: OrderStatus::Placed,
            to: OrderStatus::Ready,
        };
        assert_eq!(err.to_string(), "Cannot move order from PLACED to READY");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "location".to_string(),
        };
        assert_eq!(err.to_string(), "location is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 10,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 10");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::CocktailDisabled {
            name: "Negroni".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
