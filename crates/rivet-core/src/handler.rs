//! Handler traits for command dispatch and stream observation.
//!
//! Both traits are object-safe and blanket-implemented for plain async
//! functions/closures, so registration sites stay free of boilerplate:
//!
//! ```rust,ignore
//! router.register_command("echo", |event: ChatEvent| async move {
//!     let text = event.parsed().map(|p| p.raw_args.clone()).unwrap_or_default();
//!     event.reply(&text).await?;
//!     Ok(Outcome::Done)
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
pub use futures::future::BoxFuture;

use crate::bus::EventStream;
use crate::error::HandlerError;
use crate::event::ChatEvent;

// =============================================================================
// Command Handlers
// =============================================================================

/// What a command handler produced, when it did not fail.
///
/// `Suppressed` is the explicit "do nothing further" signal: the handler
/// finished and the router should not take any follow-up action on its
/// behalf. It replaces the ambiguous convention of completing with an
/// empty result stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler completed its work.
    Done,
    /// The handler deliberately produced no effect.
    Suppressed,
}

/// Result type returned by command handlers.
pub type HandlerResult = Result<Outcome, HandlerError>;

/// A registered command handler.
///
/// Invoked with an event whose [`parsed`](ChatEvent::parsed) command is
/// attached. The handler may perform arbitrary asynchronous work (sends,
/// timers, nested I/O) before completing; the router awaits that work in
/// an isolated task, so a slow or failing handler affects only itself.
pub trait CommandHandler: Send + Sync {
    /// Executes the handler for one event.
    fn call(&self, event: ChatEvent) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> CommandHandler for F
where
    F: Fn(ChatEvent) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, event: ChatEvent) -> BoxFuture<'static, HandlerResult> {
        (self)(event).boxed()
    }
}

/// A shared, type-erased command handler.
pub type BoxedCommandHandler = Arc<dyn CommandHandler>;

/// Converts a handler function into a boxed handler.
pub fn into_handler<H>(handler: H) -> BoxedCommandHandler
where
    H: CommandHandler + 'static,
{
    Arc::new(handler)
}

// =============================================================================
// Stream Handlers
// =============================================================================

/// An independent observer of the full event stream.
///
/// Each registered stream handler receives its own [`EventStream`]
/// subscription and runs in its own task; it sees every event, including
/// those the dispatch pipeline later treats as commands. Stream handlers
/// produce side effects only (through the transport handle carried by the
/// events) and cannot affect command dispatch or one another.
pub trait StreamHandler: Send + Sync {
    /// Consumes the event stream until it ends.
    fn run(&self, events: EventStream) -> BoxFuture<'static, ()>;
}

impl<F, Fut> StreamHandler for F
where
    F: Fn(EventStream) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn run(&self, events: EventStream) -> BoxFuture<'static, ()> {
        (self)(events).boxed()
    }
}

/// A shared, type-erased stream handler.
pub type BoxedStreamHandler = Arc<dyn StreamHandler>;

/// Converts a stream handler function into a boxed handler.
pub fn into_stream_handler<H>(handler: H) -> BoxedStreamHandler
where
    H: StreamHandler + 'static,
{
    Arc::new(handler)
}
