//! # Topics
//!
//! Topics are opaque strings. Four namespaces are in use:
//!
//! | Topic              | Who may join                     | What arrives                 |
//! |--------------------|----------------------------------|------------------------------|
//! | `user:<id>`        | that user                        | updates to their own orders  |
//! | `role:<ROLE>`      | staff holding that role          | every order event            |
//! | `orders:global`    | staff                            | every order event            |
//! | `inventory:global` | everyone                         | stock and menu changes       |

use taproom_core::Role;

/// Every order event, staff only.
pub const ORDERS_GLOBAL: &str = "orders:global";

/// Stock and menu changes, open to all.
pub const INVENTORY_GLOBAL: &str = "inventory:global";

/// Personal topic of one user.
pub fn user_topic(user_id: &str) -> String {
    format!("user:{user_id}")
}

/// Topic shared by everyone holding `role`.
pub fn role_topic(role: Role) -> String {
    format!("role:{}", role.as_str())
}

/// Topics an identity may subscribe to.
///
/// Plain users get their own topic and inventory. Staff additionally get
/// the global order feed and their role topic.
pub fn allowed_topics(user_id: &str, role: Role) -> Vec<String> {
    let mut topics = vec![user_topic(user_id), INVENTORY_GLOBAL.to_string()];

    if role.is_staff() {
        topics.push(ORDERS_GLOBAL.to_string());
        topics.push(role_topic(role));
    }

    topics
}

/// Audience of every order event: all staff role topics plus the global feed.
pub fn staff_audience() -> Vec<String> {
    let mut topics: Vec<String> = Role::STAFF.iter().map(|role| role_topic(*role)).collect();
    topics.push(ORDERS_GLOBAL.to_string());
    topics
}
