//! # Order Lifecycle
//!
//! The legal transition table for [`OrderStatus`].
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   PLACED ──► ACCEPTED ──► IN_PROGRESS ──► READY ──► DELIVERED           │
//! │     │           │              │            │                           │
//! │     └───────────┴──────────────┴────────────┴──────► CANCELLED          │
//! │                                                                         │
//! │   PLACED is the only initial state.                                    │
//! │   DELIVERED and CANCELLED are terminal (absorbing).                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table is checked against the status read inside the persisting
//! transaction, never against a status supplied by the client.

use crate::error::{CoreError, CoreResult};
use crate::types::OrderStatus;

impl OrderStatus {
    /// The sole initial state.
    pub const INITIAL: OrderStatus = OrderStatus::Placed;

    /// Statuses reachable in one step.
    pub const fn allowed_next(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Placed => &[OrderStatus::Accepted, OrderStatus::Cancelled],
            OrderStatus::Accepted => &[OrderStatus::InProgress, OrderStatus::Cancelled],
            OrderStatus::InProgress => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    /// True if `to` is reachable in one step.
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        self.allowed_next().contains(&to)
    }

    /// True for `DELIVERED` and `CANCELLED`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Orders still on the bartenders' queue.
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// Validates a move from `from` to `to`.
///
/// ## Example
/// ```rust
/// use taproom_core::lifecycle::check_transition;
/// use taproom_core::OrderStatus;
///
/// assert!(check_transition(OrderStatus::Ready, OrderStatus::Delivered).is_ok());
/// assert!(check_transition(OrderStatus::Placed, OrderStatus::Ready).is_err());
/// ```
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
