//! Hub error types.
//!
//! A full subscriber queue is not an error: the event is dropped for that
//! subscriber and the publisher carries on.

use thiserror::Error;

/// Errors surfaced by the hub and its connection pump.
#[derive(Debug, Error)]
pub enum HubError {
    /// The client side of a stream is gone.
    #[error("Stream sink closed")]
    SinkClosed,

    /// Payload could not be turned into JSON.
    #[error("Event encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for hub operations.
pub type HubResult<T> = Result<T, HubError>;
