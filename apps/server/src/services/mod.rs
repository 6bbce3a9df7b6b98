//! Service layer.
//!
//! Services sit between routes and the repositories. They decide who may do
//! what, and they publish to the hub only after a write has committed.

pub mod inventory_service;
pub mod order_service;

pub use inventory_service::{InventoryService, MenuItem, ProductState};
pub use order_service::OrderService;
