//! # Notification Hub
//!
//! Topic → subscriber registry with bounded, non-blocking delivery.
//!
//! ## Registry
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RwLock<HashMap<topic, HashMap<subscriber id, mpsc::Sender>>>          │
//! │                                                                         │
//! │  "orders:global"   ──► { 1: tx₁, 4: tx₄ }                              │
//! │  "role:BARTENDER"  ──► { 1: tx₁ }                                      │
//! │  "user:ana"        ──► { 2: tx₂ }                                      │
//! │  "inventory:global"──► { 1: tx₁, 2: tx₂, 4: tx₄ }                      │
//! │                                                                         │
//! │  subscribe / unsubscribe : write lock                                  │
//! │  publish                 : read lock, clone senders, release, deliver  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each subscriber's queue is owned by its [`Subscription`]; once a message
//! is enqueued no further locking is involved. The registry lock is a
//! `parking_lot` lock and is never held across an `.await` or a send.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::debug;

use crate::event::Notification;

/// Queue capacity used by [`NotificationHub::subscribe_default`] and for
/// a requested capacity of zero.
pub const DEFAULT_CAPACITY: usize = 32;

type SubscriberId = u64;
type Registry = HashMap<String, HashMap<SubscriberId, mpsc::Sender<Notification>>>;

#[derive(Debug, Default)]
struct HubInner {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
}

impl HubInner {
    fn remove(&self, id: SubscriberId, topics: &[String]) -> bool {
        let mut registry = self.registry.write();
        let mut removed = false;

        for topic in topics {
            if let Some(subscribers) = registry.get_mut(topic) {
                removed |= subscribers.remove(&id).is_some();
                if subscribers.is_empty() {
                    registry.remove(topic);
                }
            }
        }

        removed
    }

    /// Drops every registration whose receiver is gone.
    fn prune(&self, stale: &HashSet<SubscriberId>) {
        let mut registry = self.registry.write();
        registry.retain(|_, subscribers| {
            subscribers.retain(|id, _| !stale.contains(id));
            !subscribers.is_empty()
        });
    }
}

// =============================================================================
// Hub
// =============================================================================

/// Process-wide topic broker. Cheap to clone; clones share one registry.
#[derive(Debug, Clone, Default)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl NotificationHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        NotificationHub::default()
    }

    /// Registers interest in `topics` with a queue of `capacity` messages.
    ///
    /// Only events published after this call are observed. A capacity of
    /// zero means [`DEFAULT_CAPACITY`]. Duplicate topics are joined once.
    ///
    /// Dropping the [`Subscription`] without unsubscribing is allowed; the
    /// stale registration is pruned on the next publish that reaches it.
    pub fn subscribe<I, S>(&self, topics: I, capacity: usize) -> (Subscription, Unsubscribe)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        let (tx, rx) = mpsc::channel(capacity);

        let mut joined: Vec<String> = Vec::new();
        for topic in topics {
            let topic = topic.into();
            if !joined.contains(&topic) {
                joined.push(topic);
            }
        }

        {
            let mut registry = self.inner.registry.write();
            for topic in &joined {
                registry
                    .entry(topic.clone())
                    .or_default()
                    .insert(id, tx.clone());
            }
        }

        debug!(subscriber = id, topics = ?joined, capacity, "Subscribed");

        let subscription = Subscription { id, rx };
        let unsubscribe = Unsubscribe {
            hub: Arc::downgrade(&self.inner),
            id,
            topics: joined.into(),
        };

        (subscription, unsubscribe)
    }

    /// [`subscribe`](Self::subscribe) with [`DEFAULT_CAPACITY`].
    pub fn subscribe_default<I, S>(&self, topics: I) -> (Subscription, Unsubscribe)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscribe(topics, DEFAULT_CAPACITY)
    }

    /// Delivers `event` to every current subscriber of `topic`.
    ///
    /// Never blocks. Returns how many subscribers accepted the event.
    pub fn publish(&self, topic: &str, event: &Notification) -> usize {
        let targets: Vec<(SubscriberId, mpsc::Sender<Notification>)> = {
            let registry = self.inner.registry.read();
            registry
                .get(topic)
                .map(|subscribers| {
                    subscribers
                        .iter()
                        .map(|(id, tx)| (*id, tx.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        self.deliver(targets, event)
    }

    /// Delivers `event` to the union of subscribers of `topics`.
    ///
    /// A subscriber present in several of the topics receives one copy.
    pub fn publish_to<S: AsRef<str>>(&self, topics: &[S], event: &Notification) -> usize {
        let targets: HashMap<SubscriberId, mpsc::Sender<Notification>> = {
            let registry = self.inner.registry.read();
            topics
                .iter()
                .filter_map(|topic| registry.get(topic.as_ref()))
                .flat_map(|subscribers| subscribers.iter().map(|(id, tx)| (*id, tx.clone())))
                .collect()
        };

        self.deliver(targets, event)
    }

    /// Number of distinct live subscribers.
    pub fn subscriber_count(&self) -> usize {
        let registry = self.inner.registry.read();
        registry
            .values()
            .flat_map(|subscribers| subscribers.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of topics with at least one subscriber.
    pub fn topic_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    fn deliver<T>(&self, targets: T, event: &Notification) -> usize
    where
        T: IntoIterator<Item = (SubscriberId, mpsc::Sender<Notification>)>,
    {
        let mut delivered = 0;
        let mut stale = HashSet::new();

        for (id, tx) in targets {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!(subscriber = id, kind = %event.kind, "Queue full, event dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    stale.insert(id);
                }
            }
        }

        if !stale.is_empty() {
            debug!(count = stale.len(), "Pruning closed subscribers");
            self.inner.prune(&stale);
        }

        delivered
    }
}

// =============================================================================
// Subscriber Handles
// =============================================================================

/// Receiving end of a subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Notification>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once unsubscribed and the queue is drained.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Takes the next queued event without waiting.
    pub fn try_recv(&mut self) -> Result<Notification, TryRecvError> {
        self.rx.try_recv()
    }
}

/// Removes a subscriber from every topic it joined.
///
/// Idempotent and safe to call after the hub itself is gone. Removing the
/// registrations drops the hub's senders, which closes the subscriber's
/// queue and releases a blocked [`Subscription::recv`].
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    hub: Weak<HubInner>,
    id: SubscriberId,
    topics: Arc<[String]>,
}

impl Unsubscribe {
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.hub.upgrade() {
            if inner.remove(self.id, &self.topics) {
                debug!(subscriber = self.id, "Unsubscribed");
            }
        }
    }

    /// Topics this subscriber joined.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
