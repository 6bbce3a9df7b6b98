//! # Event Envelope
//!
//! Every published message has the same logical shape:
//!
//! ```json
//! { "type": "order:updated", "data": { "order": { ... } } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::HubResult;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "order:created")]
    OrderCreated,
    #[serde(rename = "order:updated")]
    OrderUpdated,
    #[serde(rename = "inventory:updated")]
    InventoryUpdated,
}

impl EventKind {
    /// Wire name, also used as the SSE `event:` field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::OrderCreated => "order:created",
            EventKind::OrderUpdated => "order:updated",
            EventKind::InventoryUpdated => "inventory:updated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published event: `{type, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: serde_json::Value,
}

impl Notification {
    /// Wraps an already-built JSON payload.
    pub fn new(kind: EventKind, data: serde_json::Value) -> Self {
        Notification { kind, data }
    }

    /// Serializes `payload` into the envelope.
    pub fn from_payload<T: Serialize>(kind: EventKind, payload: &T) -> HubResult<Self> {
        Ok(Notification {
            kind,
            data: serde_json::to_value(payload)?,
        })
    }

    /// The envelope as a JSON string, ready to flush to a client.
    pub fn to_json(&self) -> HubResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let ev = Notification::new(EventKind::OrderCreated, json!({"order": {"id": "o1"}}));
        let wire: serde_json::Value = serde_json::from_str(&ev.to_json().unwrap()).unwrap();

        assert_eq!(wire["type"], "order:created");
        assert_eq!(wire["data"]["order"]["id"], "o1");
    }

    #[test]
    fn test_kind_names() {
        for kind in [
            EventKind::OrderCreated,
            EventKind::OrderUpdated,
            EventKind::InventoryUpdated,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_from_payload() {
        #[derive(Serialize)]
        struct Stock {
            product_id: &'static str,
            stock: Option<i64>,
        }

        let ev = Notification::from_payload(
            EventKind::InventoryUpdated,
            &Stock {
                product_id: "p1",
                stock: None,
            },
        )
        .unwrap();
        assert_eq!(ev.data, json!({"product_id": "p1", "stock": null}));
    }
}
