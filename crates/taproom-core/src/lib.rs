//! # taproom-core: Pure Business Logic for Taproom
//!
//! This crate is the **heart** of Taproom. It contains the ordering rules as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Taproom Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    POST /api/orders, POST /api/orders/{id}/status, SSE ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ taproom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌──────────────┐  ┌───────────┐  ┌─────────┐  │   │
//! │  │   │   types   │  │ availability │  │ lifecycle │  │validation│ │   │
//! │  │   │  Product  │  │ stock > flag │  │  PLACED → │  │ qty 1-10 │ │   │
//! │  │   │  Order    │  │ required     │  │  ACCEPTED │  │ location │ │   │
//! │  │   └───────────┘  └──────────────┘  └───────────┘  └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    taproom-db (Database Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Cocktail, Order, OrderEvent, ...)
//! - [`availability`] - Derived availability rules
//! - [`lifecycle`] - Order status transition table
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use taproom_core::availability::product_available;
//! use taproom_core::OrderStatus;
//!
//! // A present stock counter always wins over the manual flag
//! assert!(product_available(false, Some(5)));
//! assert!(!product_available(true, Some(0)));
//!
//! assert!(OrderStatus::Placed.can_transition_to(OrderStatus::Accepted));
//! assert!(!OrderStatus::Placed.can_transition_to(OrderStatus::Ready));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod error;
pub mod lifecycle;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum quantity of a single order.
pub const MIN_ORDER_QUANTITY: i64 = 1;

/// Maximum quantity of a single order.
///
/// ## Business Reason
/// One order is one round carried by one bartender. Larger groups place
/// several orders.
pub const MAX_ORDER_QUANTITY: i64 = 10;

/// Maximum length of the delivery location.
pub const MAX_LOCATION_LEN: usize = 120;

/// Maximum length of free-text order notes.
pub const MAX_NOTES_LEN: usize = 500;
