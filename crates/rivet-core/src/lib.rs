//! # Rivet Core
//!
//! The event bus and command routing engine of the Rivet bot framework.
//!
//! This crate provides the building blocks for routing inbound chat events:
//! a canonical event model, a multicast event bus, a pure command parser,
//! registries for command and stream handlers, and the router that ties
//! them together with per-invocation failure isolation.
//!
//! ## Architecture
//!
//! All events flow from a transport driver through the [`BotService`] onto
//! the bus, and from there to the [`Router`] and every stream handler:
//!
//! ```text
//! ┌───────────┐    ┌────────────┐    ┌──────────┐    ┌─────────────────┐
//! │ transport │───▶│ BotService │───▶│ EventBus │───▶│ Router dispatch │──▶ handlers
//! │  driver   │    │ (normalize)│    │(multicast)───▶│ stream handlers │
//! └───────────┘    └────────────┘    └──────────┘    └─────────────────┘
//! ```
//!
//! - **[`BotService`]**: owns the bus and the transport; the single place
//!   raw platform updates become canonical [`ChatEvent`]s
//! - **[`EventBus`]**: broadcast channel; every subscriber gets an
//!   independent live view
//! - **[`Router`]**: classifies events, parses command text, resolves
//!   handlers by name and executes each invocation in an isolated task
//! - **[`Transport`]**: the narrow seam to the chat platform
//!
//! ## Example
//!
//! ```rust,ignore
//! use rivet_core::{BotService, ChatEvent, Outcome, Router};
//! use std::sync::Arc;
//!
//! let service = Arc::new(BotService::new(transport));
//! let mut router = Router::new(Arc::clone(&service));
//!
//! router.register_command("echo", |event: ChatEvent| async move {
//!     let text = event.parsed().map(|p| p.raw_args.clone()).unwrap_or_default();
//!     event.reply(&text).await?;
//!     Ok(Outcome::Done)
//! });
//!
//! let handle = router.start_routing();
//! // feed service.handle_update(..) from the transport driver
//! ```

pub mod bus;
pub mod error;
pub mod event;
pub mod handler;
pub mod parse;
pub mod registry;
pub mod router;
pub mod service;
pub mod transport;

pub use bus::{DEFAULT_BUS_CAPACITY, EventBus, EventStream};
pub use error::{DispatchError, HandlerError, TransportError, TransportResult};
pub use event::{ChatEvent, ParsedCommand, RawUpdate, SenderProfile, UpdateKind};
pub use handler::{
    BoxFuture, BoxedCommandHandler, BoxedStreamHandler, CommandHandler, HandlerResult, Outcome,
    StreamHandler, into_handler, into_stream_handler,
};
pub use parse::{COMMAND_MARKER, parse_command};
pub use registry::CommandRegistry;
pub use router::{Router, RouterHandle};
pub use service::BotService;
pub use transport::{BoxedTransport, Transport};

/// Prelude for common imports.
pub mod prelude {
    pub use super::bus::{EventBus, EventStream};
    pub use super::error::{HandlerError, TransportError, TransportResult};
    pub use super::event::{ChatEvent, ParsedCommand, RawUpdate, SenderProfile, UpdateKind};
    pub use super::handler::{CommandHandler, HandlerResult, Outcome, StreamHandler};
    pub use super::router::{Router, RouterHandle};
    pub use super::service::BotService;
    pub use super::transport::{BoxedTransport, Transport};
}
