//! Live viewer presence
//!
//! [`PresenceHub`] owns the connected-viewer counter and the set of listeners
//! interested in it. Every change is pushed to each listener over its own
//! unbounded channel while the hub lock is held, so listeners observe counts
//! in the order they were produced.
//!
//! Listener registration is tied to value lifetimes: a [`Subscription`]
//! unregisters itself when dropped, and a [`Viewer`] (subscription plus a
//! counted connection) also disconnects. A live stream that is dropped on
//! client disconnect therefore cannot leak a listener.

use parking_lot::Mutex;
use prometheus::IntGauge;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// SSE event name carrying count updates
pub const CHANGE_EVENT: &str = "connected-users:change";

/// Identifier handed out per subscription
pub type ListenerId = u64;

#[derive(Default)]
struct Inner {
    count: usize,
    listeners: HashMap<ListenerId, UnboundedSender<usize>>,
}

/// Connected-viewer counter with change fan-out
#[derive(Default)]
pub struct PresenceHub {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
    gauge: Option<IntGauge>,
}

impl PresenceHub {
    /// Create a hub with a zero count and no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hub that mirrors its count into `gauge`
    pub fn with_gauge(gauge: IntGauge) -> Self {
        Self {
            gauge: Some(gauge),
            ..Self::default()
        }
    }

    /// Count one more viewer and notify listeners; returns the new count
    pub fn connect(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.count += 1;
        self.publish(&mut inner)
    }

    /// Count one viewer less (never below zero) and notify listeners
    pub fn disconnect(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.count = inner.count.saturating_sub(1);
        self.publish(&mut inner)
    }

    /// Current number of connected viewers
    pub fn count(&self) -> usize {
        self.inner.lock().count
    }

    /// Register a listener for count changes
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().listeners.insert(id, tx);
        debug!(listener = id, "presence listener subscribed");

        Subscription {
            id,
            hub: Arc::clone(self),
            rx,
        }
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = self.inner.lock().listeners.remove(&id).is_some();
        if removed {
            debug!(listener = id, "presence listener unsubscribed");
        }
        removed
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    fn publish(&self, inner: &mut Inner) -> usize {
        let count = inner.count;
        if let Some(gauge) = &self.gauge {
            gauge.set(count as i64);
        }

        // A failed send means the receiver is gone.
        inner.listeners.retain(|_, tx| tx.send(count).is_ok());
        debug!(count, listeners = inner.listeners.len(), "presence changed");
        count
    }
}

/// A registered listener; unsubscribes on drop
pub struct Subscription {
    id: ListenerId,
    hub: Arc<PresenceHub>,
    rx: UnboundedReceiver<usize>,
}

impl Subscription {
    /// This listener's id
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Wait for the next published count
    pub async fn recv(&mut self) -> Option<usize> {
        self.rx.recv().await
    }

    /// Take a published count if one is queued
    pub fn try_recv(&mut self) -> Option<usize> {
        match self.rx.try_recv() {
            Ok(count) => Some(count),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}

/// One live viewer: subscribed and counted for as long as it exists
pub struct Viewer {
    subscription: Subscription,
}

impl Viewer {
    /// Subscribe, then connect
    ///
    /// Subscribing first means the viewer's own connect is the first count it
    /// receives.
    pub fn open(hub: &Arc<PresenceHub>) -> Self {
        let subscription = hub.subscribe();
        hub.connect();
        Self { subscription }
    }

    /// Wait for the next published count
    pub async fn next_count(&mut self) -> Option<usize> {
        self.subscription.recv().await
    }

    /// Listener id backing this viewer
    pub fn listener_id(&self) -> ListenerId {
        self.subscription.id()
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        let hub = Arc::clone(&self.subscription.hub);
        hub.unsubscribe(self.subscription.id);
        hub.disconnect();
    }
}
