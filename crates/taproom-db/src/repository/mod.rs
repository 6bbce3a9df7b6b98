//! # Repository Module
//!
//! Database repository implementations for Taproom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service                                                               │
//! │       │  db.orders().transition_with_event(id, READY, actor, claim)    │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── BEGIN                                                             │
//! │  ├── SELECT current status                                             │
//! │  ├── check against lifecycle table (taproom-core)                      │
//! │  ├── UPDATE orders ... WHERE status = <current>                        │
//! │  ├── INSERT order_events                                               │
//! │  └── COMMIT                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Products, stock and availability flags
//! - [`cocktail::CocktailRepository`] - Cocktails joined with ingredient state
//! - [`order::OrderRepository`] - Orders and their audit trail
//! - [`user::UserRepository`] - Identity lookups

pub mod cocktail;
pub mod order;
pub mod product;
pub mod user;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support;
