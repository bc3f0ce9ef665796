//! # Event Publisher
//!
//! Publishing side of the bus plus per-topic delivery counts.

use crate::events::{CoreEvent, EventFilter, EventTopic};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Anything that announces committed transitions.
///
/// Subsystems call this only after every entity lock of the transition has
/// been released, so a slow consumer never holds up a claim or an audit.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Announce one event; returns how many subscribers saw it.
    async fn publish(&self, event: CoreEvent) -> usize;

    /// Announce `events` in order.
    async fn publish_all(&self, events: Vec<CoreEvent>) {
        for event in events {
            self.publish(event).await;
        }
    }

    /// Events announced so far, delivered or not.
    fn events_published(&self) -> u64;
}

/// Published and undelivered counts for one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicCounts {
    /// Events announced on the topic.
    pub published: u64,
    /// Events announced while nobody was subscribed.
    pub undelivered: u64,
}

/// Broadcast-backed bus shared by every subsystem in one process.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<CoreEvent>,
    counts: Mutex<HashMap<EventTopic, TopicCounts>>,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] events per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            counts: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Subscribe with a pull-style handle.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "[bus] Subscription opened");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Subscribe as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    /// Live receivers, whatever their filter.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Counts for one topic.
    #[must_use]
    pub fn topic_counts(&self, topic: EventTopic) -> TopicCounts {
        self.counts.lock().get(&topic).copied().unwrap_or_default()
    }

    /// Events buffered per subscriber before it starts missing events.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: CoreEvent) -> usize {
        let topic = event.topic();
        let delivered = self.sender.send(event).unwrap_or(0);
        {
            let mut counts = self.counts.lock();
            let entry = counts.entry(topic).or_default();
            entry.published += 1;
            if delivered == 0 {
                entry.undelivered += 1;
            }
        }
        // Nobody listening is normal for notifications.
        trace!(topic = ?topic, receivers = delivered, "[bus] Event published");
        delivered
    }

    fn events_published(&self) -> u64 {
        self.counts.lock().values().map(|c| c.published).sum()
    }
}
