//! # Domain Types
//!
//! Core domain types used throughout Taproom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │◄──│ IngredientLink  │◄──│    Cocktail     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  is_available   │   │  is_required    │   │  is_enabled     │       │
//! │  │  stock (opt)    │   │  product state  │   │  ingredients[]  │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                        │                │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │      User       │──►│     Order       │◄──│   OrderEvent    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  role           │   │  status         │   │  from → to      │       │
//! │  │                 │   │  assigned staff │   │  actor          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived State
//! Availability is never a stored column. [`Product::is_available_now`] and
//! [`Cocktail::is_available_now`] recompute it from the current flags on every
//! call, see [`crate::availability`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::availability;
use crate::error::ValidationError;

// =============================================================================
// Role
// =============================================================================

/// The role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// A patron placing orders.
    User,
    /// Works the order queue.
    Bartender,
    /// Full staff rights.
    Admin,
}

impl Role {
    /// Staff roles work the queue and see every order.
    #[inline]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Role::Bartender | Role::Admin)
    }

    /// All roles considered staff.
    pub const STAFF: [Role; 2] = [Role::Admin, Role::Bartender];

    /// Wire name (`USER`, `BARTENDER`, `ADMIN`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Bartender => "BARTENDER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "BARTENDER" => Ok(Role::Bartender),
            "ADMIN" => Ok(Role::Admin),
            other => Err(ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: format!("unknown role '{}'", other),
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// An identity known to the system.
///
/// Account administration lives elsewhere; Taproom only reads users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
}

// =============================================================================
// Product
// =============================================================================

/// An ingredient or stocked item behind the bar.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-form grouping ("spirits", "mixers", "garnish").
    pub category: String,

    /// Manual availability switch, used only while `stock` is absent.
    pub is_available: bool,

    /// Optional stock counter. When present it decides availability.
    pub stock: Option<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Current availability under the stock-overrides-flag rule.
    #[inline]
    pub fn is_available_now(&self) -> bool {
        availability::product_available(self.is_available, self.stock)
    }
}

// =============================================================================
// Cocktail
// =============================================================================

/// One ingredient of a cocktail, carrying the linked product's current state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct IngredientLink {
    pub product_id: String,
    pub product_name: String,
    /// Ordering within the recipe.
    pub position: i64,
    /// Only required ingredients gate availability.
    pub is_required: bool,
    /// Product flag at read time.
    pub product_is_available: bool,
    /// Product stock at read time.
    pub product_stock: Option<i64>,
}

impl IngredientLink {
    /// Availability of the linked product.
    #[inline]
    pub fn product_available(&self) -> bool {
        availability::product_available(self.product_is_available, self.product_stock)
    }
}

/// A drink on the menu.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cocktail {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// Staff switch. A disabled cocktail is never orderable.
    pub is_enabled: bool,
    /// Recipe, ordered by `position`.
    pub ingredients: Vec<IngredientLink>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cocktail {
    /// Derived availability, recomputed from the ingredient state carried by
    /// this value.
    pub fn is_available_now(&self) -> bool {
        availability::cocktail_available(
            self.is_enabled,
            self.ingredients
                .iter()
                .map(|link| (link.is_required, link.product_available())),
        )
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order. Legal moves live in [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Accepted,
    InProgress,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Placed,
        OrderStatus::Accepted,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Wire and storage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::INITIAL
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown status '{}'", s.trim()),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A patron's order for one cocktail.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Owning patron.
    pub user_id: String,
    pub cocktail_id: String,
    pub quantity: i64,
    /// Free-text notes ("no ice").
    pub notes: String,
    /// Where to deliver ("table 4", "bar seat 2").
    pub location: String,
    /// Materialized copy of the last audit event's `to_status`.
    pub status: OrderStatus,
    /// Staff member who claimed the order.
    pub assigned_staff_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub cocktail_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: String,
    pub location: String,
}

// =============================================================================
// Order Event
// =============================================================================

/// Append-only audit record of one status change.
///
/// The creation entry has no `from_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderEvent {
    pub id: i64,
    pub order_id: String,
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub actor_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
