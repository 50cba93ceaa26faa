//! Change broadcaster - per-topic fan-out of order change events
//!
//! # Architecture
//!
//! ```text
//! Engine ──▶ publish() ──┬──▶ topic "order:<id>" ──▶ guest tracking sessions
//!                        └──▶ topic "active"     ──▶ kitchen dashboards
//! ```
//!
//! Each topic is a bounded tokio broadcast channel. Publishing never
//! blocks the engine: a subscriber that cannot keep up loses the oldest
//! events in its ring (the reconciliation poller is the correctness
//! backstop). The broadcaster keeps no event history of its own.

use dashmap::DashMap;
use shared::order::{OrderChanged, Topic};
use tokio::sync::broadcast;

/// Default per-topic ring capacity
const TOPIC_CHANNEL_CAPACITY: usize = 256;

/// Per-topic subscriber registry and fan-out
///
/// Topic entries are created on first subscribe and removed when a
/// publish finds the last receiver gone.
#[derive(Debug)]
pub struct ChangeBroadcaster {
    topics: DashMap<Topic, broadcast::Sender<OrderChanged>>,
    capacity: usize,
}

impl ChangeBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(TOPIC_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to a topic, creating its channel on first use
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<OrderChanged> {
        self.topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Deliver an event to the order's own topic and the active feed
    ///
    /// Fire-and-forget: the caller is never blocked or failed by slow or
    /// absent subscribers.
    pub fn publish(&self, event: &OrderChanged) {
        self.send_to(&Topic::Order(event.order_id.clone()), event);
        self.send_to(&Topic::Active, event);
    }

    fn send_to(&self, topic: &Topic, event: &OrderChanged) {
        let Some(sender) = self.topics.get(topic) else {
            return;
        };

        if sender.send(event.clone()).is_err() {
            // Last receiver disconnected; drop the topic entry unless a
            // new subscriber arrived in the meantime
            drop(sender);
            self.topics
                .remove_if(topic, |_, sender| sender.receiver_count() == 0);
            tracing::debug!(topic = %topic, "Topic has no subscribers, channel removed");
        }
    }

    /// Number of live subscribers on a topic
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
