//! # taproom-hub: Notification Hub
//!
//! Process-wide, in-memory topic broker that pushes order and inventory
//! changes to connected clients.
//!
//! ## Delivery Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  publish("orders:global", ev)                                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  read lock ─► snapshot senders ─► release                               │
//! │        │                                                                │
//! │        ├──► sub #1 queue [■■□□]  try_send → ok                          │
//! │        ├──► sub #2 queue [■■■■]  try_send → full, dropped (debug log)   │
//! │        └──► sub #3 queue [□□□□]  try_send → ok                          │
//! │                                                                         │
//! │  The publisher never waits on a subscriber.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`hub`] - [`NotificationHub`], subscriptions and fan-out
//! - [`topic`] - Topic names and identity gating
//! - [`event`] - The `{type, data}` envelope
//! - [`stream`] - Per-connection pump over a [`StreamSink`]
//! - [`error`] - Hub error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taproom_hub::{NotificationHub, topic};
//!
//! let hub = NotificationHub::new();
//! let (mut sub, unsubscribe) = hub.subscribe(topic::allowed_topics(&user.id, user.role), 32);
//! hub.publish(topic::ORDERS_GLOBAL, &event);
//! unsubscribe.unsubscribe();
//! ```

pub mod error;
pub mod event;
pub mod hub;
pub mod stream;
pub mod topic;

pub use error::{HubError, HubResult};
pub use event::{EventKind, Notification};
pub use hub::{NotificationHub, Subscription, Unsubscribe, DEFAULT_CAPACITY};
pub use stream::{pump, PumpExit, StreamFrame, StreamSink, DEFAULT_KEEPALIVE};
