//! # Event Subscriber
//!
//! Receiving side of the bus: pull handles and `Stream`s, both filtered.

use crate::events::{CoreEvent, EventFilter};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// Pull-style subscription.
///
/// A subscriber that falls more than the bus capacity behind skips the
/// oldest events; [`Subscription::missed`] reports how many.
pub struct Subscription {
    receiver: broadcast::Receiver<CoreEvent>,
    filter: EventFilter,
    missed: u64,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<CoreEvent>, filter: EventFilter) -> Self {
        Self {
            receiver,
            filter,
            missed: 0,
        }
    }

    /// Next matching event; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<CoreEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => self.lagged(skipped),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered matching event, without waiting.
    pub fn try_recv(&mut self) -> Result<Option<CoreEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => self.lagged(skipped),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
            }
        }
    }

    /// Every matching event currently buffered.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        std::iter::from_fn(|| self.try_recv().ok().flatten()).collect()
    }

    /// Events skipped because this subscriber lagged.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Filter applied to this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    fn lagged(&mut self, skipped: u64) {
        self.missed += skipped;
        warn!(skipped, total = self.missed, "[bus] Subscriber lagged");
    }
}

/// A filtered `Stream` of bus events.
pub struct EventStream {
    inner: BroadcastStream<CoreEvent>,
    filter: EventFilter,
}

impl EventStream {
    pub(crate) fn new(receiver: broadcast::Receiver<CoreEvent>, filter: EventFilter) -> Self {
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
        }
    }

    /// Filter applied to this stream.
    #[must_use]
    pub fn event_filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = CoreEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if self.filter.matches(&event) {
                        return Poll::Ready(Some(event));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "[bus] Event stream lagged");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use crate::publisher::InMemoryEventBus;
    use crate::EventPublisher;
    use shared_types::{AgentId, ClaimId, MissionId};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    fn completed() -> CoreEvent {
        CoreEvent::MissionCompleted {
            mission_id: MissionId::new(),
        }
    }

    fn claim_expired() -> CoreEvent {
        CoreEvent::ClaimExpired {
            claim_id: ClaimId::new(),
        }
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        bus.publish(completed()).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");

        assert!(matches!(received, CoreEvent::MissionCompleted { .. }));
    }

    #[tokio::test]
    async fn test_subscription_filter() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Claims]));

        // Mission event is filtered out
        bus.publish(completed()).await;

        let agent_id = AgentId::new();
        bus.publish(CoreEvent::ClaimCreated {
            claim_id: ClaimId::new(),
            mission_id: MissionId::new(),
            agent_id,
        })
        .await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");

        assert!(matches!(
            received,
            CoreEvent::ClaimCreated { agent_id: a, .. } if a == agent_id
        ));
    }

    #[tokio::test]
    async fn test_lagging_subscriber_counts_missed_events() {
        let bus = InMemoryEventBus::with_capacity(2);
        let mut sub = bus.subscribe(EventFilter::all());

        for _ in 0..5 {
            bus.publish(claim_expired()).await;
        }

        assert_eq!(sub.drain().len(), 2);
        assert_eq!(sub.missed(), 3);
    }

    #[tokio::test]
    async fn test_dropped_subscription_releases_receiver() {
        let bus = InMemoryEventBus::new();
        {
            let _sub = bus.subscribe(EventFilter::all());
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());
        assert!(matches!(sub.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_drain() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Claims]));

        bus.publish(claim_expired()).await;
        bus.publish(completed()).await;
        bus.publish(claim_expired()).await;

        let drained = sub.drain();
        assert_eq!(drained.len(), 2);
        assert!(sub.drain().is_empty());
    }

    #[tokio::test]
    async fn test_event_stream_filters() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::topics(vec![EventTopic::Claims]));
        assert_eq!(stream.event_filter().topics, vec![EventTopic::Claims]);

        bus.publish(completed()).await;
        bus.publish(claim_expired()).await;

        let next = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout")
            .expect("event");
        assert!(matches!(next, CoreEvent::ClaimExpired { .. }));
    }
}
