//! # Rivet
//!
//! An event-driven message router for chat-bots.
//!
//! ## Overview
//!
//! Rivet ingests a stream of inbound chat events, classifies each as a
//! plain message or a command, dispatches commands to registered handlers
//! by name, and lets independent stream handlers observe the raw event
//! stream concurrently. One failing handler can never break the stream
//! for other handlers or other commands.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐    ┌────────────┐    ┌──────────┐    ┌─────────────────┐
//! │ transport │───▶│ BotService │───▶│ EventBus │───▶│ Router dispatch │──▶ command handlers
//! │  driver   │    │ (normalize)│    │(multicast)───▶│ stream handlers │    (isolated tasks)
//! └───────────┘    └────────────┘    └──────────┘    └─────────────────┘
//! ```
//!
//! - **Transport**: the narrow seam to a chat platform; out of routing's
//!   scope beyond "send text to chat X"
//! - **BotService**: normalizes raw platform updates into canonical events
//!   and owns the bus
//! - **Router**: parses command-shaped text, resolves handlers by name,
//!   executes each invocation in an isolated task
//! - **Runtime**: configuration, logging, signal-driven run loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rivet::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = Runtime::new();
//!     let service = Arc::new(BotService::new(my_transport()));
//!     let mut router = Router::new(Arc::clone(&service));
//!
//!     router.register_command("echo", |event: ChatEvent| async move {
//!         let text = event.parsed().map(|p| p.raw_args.clone()).unwrap_or_default();
//!         event.reply(&text).await?;
//!         Ok(Outcome::Done)
//!     });
//!
//!     runtime.run(router).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use rivet_core;
pub use rivet_runtime;

pub use rivet_core::{
    BotService, BoxedCommandHandler, BoxedStreamHandler, BoxedTransport, ChatEvent,
    CommandHandler, CommandRegistry, DispatchError, EventBus, EventStream, HandlerError,
    HandlerResult, Outcome, ParsedCommand, RawUpdate, Router, RouterHandle, SenderProfile,
    StreamHandler, Transport, TransportError, TransportResult, UpdateKind,
};
pub use rivet_runtime::{LoggingBuilder, RivetConfig, Runtime, RuntimeBuilder};

/// Prelude for common imports.
pub mod prelude {
    pub use rivet_core::prelude::*;
    pub use rivet_runtime::{Runtime, RuntimeBuilder};
}
