//! Bot service: owns the event bus and the transport handle.
//!
//! The service is the single place where raw platform updates become
//! canonical [`ChatEvent`]s. A transport driver feeds it through
//! [`handle_update`](BotService::handle_update) for ordinary updates and
//! [`handle_command`](BotService::handle_command) for pre-filtered command
//! shortcuts; everything downstream of the bus sees only canonical events.
//!
//! The service is passed by `Arc` to the router at construction time —
//! dependency injection of the bus instance, no process-wide state.

use tracing::debug;

use crate::bus::{EventBus, EventStream};
use crate::error::TransportResult;
use crate::event::{ChatEvent, RawUpdate};
use crate::transport::BoxedTransport;

/// The unified inbound event stream plus the outbound send path.
pub struct BotService {
    bus: EventBus,
    transport: BoxedTransport,
}

impl BotService {
    /// Creates a service over the given transport with the default bus
    /// capacity.
    pub fn new(transport: BoxedTransport) -> Self {
        Self {
            bus: EventBus::default(),
            transport,
        }
    }

    /// Creates a service with an explicit bus capacity.
    pub fn with_capacity(transport: BoxedTransport, capacity: usize) -> Self {
        Self {
            bus: EventBus::new(capacity),
            transport,
        }
    }

    /// Normalizes a raw update and publishes it on the bus.
    pub fn handle_update(&self, update: RawUpdate) {
        debug!(
            chat_id = update.chat_id,
            sender_id = update.from.id,
            kind = ?update.kind,
            "received update"
        );
        self.bus
            .publish(ChatEvent::from_update(update, self.transport.clone()));
    }

    /// Publishes an update delivered through a pre-filtered command
    /// shortcut, tagged with the command name.
    ///
    /// Shortcut events bypass free-text parsing: the router synthesizes a
    /// bare parsed command from the tag.
    pub fn handle_command(&self, name: &str, update: RawUpdate) {
        debug!(
            command = name,
            chat_id = update.chat_id,
            sender_id = update.from.id,
            "received command shortcut"
        );
        self.bus
            .publish(ChatEvent::from_command(name, update, self.transport.clone()));
    }

    /// Returns an independent live view of all future events.
    pub fn subscribe(&self) -> EventStream {
        self.bus.subscribe()
    }

    /// Sends a text message to the given chat.
    ///
    /// Delegates to the transport; failures are reported, not retried.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> TransportResult<()> {
        self.transport.send_text(chat_id, text).await
    }

    /// Returns the transport handle.
    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }
}

impl std::fmt::Debug for BotService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotService")
            .field("transport", &self.transport.name())
            .field("bus", &self.bus)
            .finish()
    }
}
