//! Event bus: the single multicast point of truth for inbound events.
//!
//! The bus decouples the transport adapter from every consumer. Publishing
//! is synchronous and non-blocking; each subscriber gets an independent live
//! view of all events from the moment it subscribed. There is no replay and
//! no back-pressure: a subscriber that falls behind the channel capacity
//! loses the oldest events (see [`EventStream::next`]) rather than slowing
//! the publisher down.

use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::event::ChatEvent;

/// Default ring capacity for the underlying broadcast channel.
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// A multicast channel of [`ChatEvent`]s.
///
/// Owned by the [`BotService`](crate::service::BotService) and handed by
/// reference to whoever needs to publish or subscribe; there is no global
/// instance.
pub struct EventBus {
    sender: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    /// Creates a bus with the given ring capacity.
    ///
    /// Capacity bounds how far a slow subscriber may fall behind before it
    /// starts losing events. Must be non-zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcasts an event to every current subscriber.
    ///
    /// Subscribers that join later never see this event. Publishing with no
    /// subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, event: ChatEvent) {
        let receivers = self.sender.receiver_count();
        trace!(chat_id = event.chat_id(), receivers, "publishing event");
        let _ = self.sender.send(event);
    }

    /// Returns a live view of all future events.
    ///
    /// Each call yields an independent subscription; subscribers do not
    /// interfere with one another.
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            inner: self.sender.subscribe(),
        }
    }

    /// Returns the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// One subscriber's live view of the event stream.
pub struct EventStream {
    inner: broadcast::Receiver<ChatEvent>,
}

impl EventStream {
    /// Waits for the next event.
    ///
    /// Events arrive in publish order. If this subscriber lagged past the
    /// bus capacity the skipped events are logged and the stream resumes at
    /// the oldest retained event. Returns `None` once the bus is dropped.
    pub async fn next(&mut self) -> Option<ChatEvent> {
        loop {
            match self.inner.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{RawUpdate, SenderProfile};
    use crate::transport::{BoxedTransport, Transport};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        fn name(&self) -> &str {
            "null"
        }

        async fn send_text(&self, _chat_id: i64, _text: &str) -> crate::error::TransportResult<()> {
            Ok(())
        }
    }

    fn event(chat_id: i64, text: &str) -> ChatEvent {
        let transport: BoxedTransport = Arc::new(NullTransport);
        ChatEvent::from_update(
            RawUpdate::text(chat_id, SenderProfile::new(1, "Ada"), text),
            transport,
        )
    }

    #[tokio::test]
    async fn each_subscriber_gets_every_event() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(event(1, "one"));
        bus.publish(event(2, "two"));

        assert_eq!(a.next().await.unwrap().chat_id(), 1);
        assert_eq!(a.next().await.unwrap().chat_id(), 2);
        assert_eq!(b.next().await.unwrap().chat_id(), 1);
        assert_eq!(b.next().await.unwrap().chat_id(), 2);
    }

    #[tokio::test]
    async fn no_replay_for_late_subscribers() {
        let bus = EventBus::new(8);
        bus.publish(event(1, "before anyone subscribed"));

        let mut stream = bus.subscribe();
        bus.publish(event(2, "after"));

        assert_eq!(stream.next().await.unwrap().chat_id(), 2);
    }

    #[tokio::test]
    async fn stream_ends_when_bus_is_dropped() {
        let bus = EventBus::new(8);
        let mut stream = bus.subscribe();
        drop(bus);

        assert!(stream.next().await.is_none());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new(8);
        bus.publish(event(1, "into the void"));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn lagged_subscriber_resumes() {
        let bus = EventBus::new(2);
        let mut stream = bus.subscribe();

        for i in 0..5 {
            bus.publish(event(i, "burst"));
        }

        // The two newest events are retained; the stream skips the rest
        // and keeps going instead of terminating.
        assert_eq!(stream.next().await.unwrap().chat_id(), 3);
        assert_eq!(stream.next().await.unwrap().chat_id(), 4);
    }
}
