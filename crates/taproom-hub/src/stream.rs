//! # Connection Pump
//!
//! One long-lived loop per connected client, moving hub events to the
//! client's transport.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  loop {                                                                 │
//! │      select! {                                                          │
//! │          sink.closed()      → client gone      → break                  │
//! │          shutdown flag set  → server stopping  → break                  │
//! │          subscription.recv  → Event frame      → sink.send              │
//! │          keep-alive tick    → KeepAlive frame  → sink.send              │
//! │      }                                                                  │
//! │  }                                                                      │
//! │  unsubscribe()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transport only needs to flush a frame and report disconnects; see
//! [`StreamSink`].

use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::{HubError, HubResult};
use crate::event::Notification;
use crate::hub::{Subscription, Unsubscribe};

/// Keep-alive period that stays under common idle-connection timeouts.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(25);

/// What the pump hands to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Event(Notification),
    KeepAlive,
}

/// Server-push transport for one client.
pub trait StreamSink: Send + Sync {
    /// Flushes one frame to the client.
    fn send(&self, frame: StreamFrame) -> impl Future<Output = HubResult<()>> + Send;

    /// Resolves when the client has disconnected.
    fn closed(&self) -> impl Future<Output = ()> + Send;
}

/// Channel-backed sink. The receiving half is the transport's outgoing
/// stream; dropping it counts as a disconnect.
impl StreamSink for mpsc::Sender<StreamFrame> {
    fn send(&self, frame: StreamFrame) -> impl Future<Output = HubResult<()>> + Send {
        async move {
            mpsc::Sender::send(self, frame)
                .await
                .map_err(|_| HubError::SinkClosed)
        }
    }

    fn closed(&self) -> impl Future<Output = ()> + Send {
        mpsc::Sender::closed(self)
    }
}

/// Why a pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// The client disconnected or its sink rejected a frame.
    ClientGone,
    /// The subscription was closed from the hub side.
    Unsubscribed,
    /// The server is shutting down.
    Shutdown,
}

/// Runs the per-connection loop until the client leaves, the subscription
/// closes or `shutdown` flips to `true`, then unsubscribes.
///
/// Disconnect is checked first on every wake-up, so a gone client never
/// receives further frames. A dropped shutdown sender is not a shutdown.
pub async fn pump<S: StreamSink>(
    mut subscription: Subscription,
    unsubscribe: Unsubscribe,
    sink: S,
    keepalive: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> PumpExit {
    let keepalive = keepalive.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + keepalive, keepalive);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let subscriber = subscription.id();
    debug!(subscriber, "Stream opened");

    let exit = loop {
        tokio::select! {
            biased;

            _ = sink.closed() => break PumpExit::ClientGone,

            true = stopping(&mut shutdown) => break PumpExit::Shutdown,

            message = subscription.recv() => match message {
                Some(event) => {
                    if sink.send(StreamFrame::Event(event)).await.is_err() {
                        break PumpExit::ClientGone;
                    }
                }
                None => break PumpExit::Unsubscribed,
            },

            _ = ticker.tick() => {
                if sink.send(StreamFrame::KeepAlive).await.is_err() {
                    break PumpExit::ClientGone;
                }
            }
        }
    };

    unsubscribe.unsubscribe();
    debug!(subscriber, ?exit, "Stream closed");

    exit
}

/// `true` once the flag is set, `false` if the sender went away first.
async fn stopping(shutdown: &mut watch::Receiver<bool>) -> bool {
    shutdown.wait_for(|stop| *stop).await.is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::hub::NotificationHub;
    use serde_json::json;

    const WAIT: Duration = Duration::from_secs(2);

    fn running() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    #[tokio::test]
    async fn test_events_reach_sink() {
        let hub = NotificationHub::new();
        let (sub, unsub) = hub.subscribe(["orders:global"], 8);
        let (tx, mut rx) = mpsc::channel(8);
        let (_stop, shutdown) = running();

        let task = tokio::spawn(pump(sub, unsub, tx, Duration::from_secs(60), shutdown));

        let ev = Notification::new(EventKind::OrderCreated, json!({"id": "o1"}));
        hub.publish("orders:global", &ev);

        let frame = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(frame, StreamFrame::Event(ev));

        drop(rx);
        let exit = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
        assert_eq!(exit, PumpExit::ClientGone);
    }

    #[tokio::test]
    async fn test_keepalive_frames() {
        let hub = NotificationHub::new();
        let (sub, unsub) = hub.subscribe(["orders:global"], 8);
        let (tx, mut rx) = mpsc::channel(8);

        let (_stop, shutdown) = running();

        let _task = tokio::spawn(pump(sub, unsub, tx, Duration::from_millis(20), shutdown));

        let frame = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(frame, StreamFrame::KeepAlive);
    }

    #[tokio::test]
    async fn test_disconnect_unsubscribes() {
        let hub = NotificationHub::new();
        let (sub, unsub) = hub.subscribe(["orders:global", "user:ana"], 8);
        let (tx, rx) = mpsc::channel(8);
        let (_stop, shutdown) = running();

        let task = tokio::spawn(pump(sub, unsub, tx, Duration::from_secs(60), shutdown));
        assert_eq!(hub.subscriber_count(), 1);

        drop(rx);
        let exit = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
        assert_eq!(exit, PumpExit::ClientGone);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.topic_count(), 0);
    }

    #[tokio::test]
    async fn test_hub_side_unsubscribe_ends_pump() {
        let hub = NotificationHub::new();
        let (sub, unsub) = hub.subscribe(["orders:global"], 8);
        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = running();

        let task = tokio::spawn(pump(sub, unsub.clone(), tx, Duration::from_secs(60), shutdown));
        unsub.unsubscribe();

        let exit = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
        assert_eq!(exit, PumpExit::Unsubscribed);
    }

    #[tokio::test]
    async fn test_shutdown_ends_pump_with_client_attached() {
        let hub = NotificationHub::new();
        let (sub, unsub) = hub.subscribe(["orders:global", "user:ana"], 8);
        let (tx, _rx) = mpsc::channel(8);
        let (stop, shutdown) = running();

        let task = tokio::spawn(pump(sub, unsub, tx, Duration::from_secs(60), shutdown));
        assert_eq!(hub.subscriber_count(), 1);

        stop.send_replace(true);
        let exit = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
        assert_eq!(exit, PumpExit::Shutdown);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_opened_after_shutdown_exits_at_once() {
        let hub = NotificationHub::new();
        let (sub, unsub) = hub.subscribe(["orders:global"], 8);
        let (tx, _rx) = mpsc::channel(8);
        let (stop, shutdown) = running();
        stop.send_replace(true);

        let exit = tokio::time::timeout(WAIT, pump(sub, unsub, tx, Duration::from_secs(60), shutdown))
            .await
            .unwrap();
        assert_eq!(exit, PumpExit::Shutdown);
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_keeps_streaming() {
        let hub = NotificationHub::new();
        let (sub, unsub) = hub.subscribe(["orders:global"], 8);
        let (tx, mut rx) = mpsc::channel(8);
        let (stop, shutdown) = running();
        drop(stop);

        let _task = tokio::spawn(pump(sub, unsub, tx, Duration::from_secs(60), shutdown));

        let ev = Notification::new(EventKind::OrderCreated, json!({"id": "o2"}));
        hub.publish("orders:global", &ev);

        let frame = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(frame, StreamFrame::Event(ev));
    }
}
