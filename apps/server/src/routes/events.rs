//! `GET /api/events`: the live notification stream.
//!
//! ```text
//! hub ──► Subscription ──► pump task ──► mpsc ──► SSE body ──► client
//!                              ▲                       │
//!                              └──── closed() ◄────────┘ (body dropped)
//! ```
//!
//! Topics come from the caller's identity, never from the request. The
//! first frame is always `event: hello`; the stream ends when the server
//! begins shutting down.

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use chrono::Utc;
use serde_json::json;
use std::convert::Infallible;
use taproom_hub::{pump, topic, StreamFrame, DEFAULT_CAPACITY};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::auth::CurrentUser;
use crate::AppState;

pub async fn stream(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let topics = topic::allowed_topics(&user.id, user.role);
    let capacity = match state.config.subscriber_capacity {
        0 => DEFAULT_CAPACITY,
        n => n,
    };
    let (subscription, unsubscribe) = state.hub.subscribe(topics, capacity);

    let (tx, rx) = mpsc::channel::<StreamFrame>(capacity);
    let keepalive = state.config.keepalive();
    let shutdown = state.shutdown_signal();
    let user_id = user.id.clone();

    tokio::spawn(async move {
        let exit = pump(subscription, unsubscribe, tx, keepalive, shutdown).await;
        debug!(user_id = %user_id, ?exit, "Event stream closed");
    });

    let frames = ReceiverStream::new(rx).map(to_event);
    Sse::new(tokio_stream::once(hello()).chain(frames).map(Ok::<_, Infallible>))
}

fn hello() -> Event {
    let data = json!({"ok": true, "ts": Utc::now().timestamp()});
    Event::default().event("hello").data(data.to_string())
}

fn to_event(frame: StreamFrame) -> Event {
    match frame {
        StreamFrame::Event(notification) => match notification.to_json() {
            Ok(json) => Event::default().event(notification.kind.as_str()).data(json),
            Err(err) => {
                warn!(error = %err, "Notification not encoded");
                Event::default().comment("dropped")
            }
        },
        StreamFrame::KeepAlive => Event::default().comment("keep-alive"),
    }
}
