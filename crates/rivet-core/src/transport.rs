//! Transport seam between the routing core and a concrete chat platform.
//!
//! The routing core never speaks a platform protocol itself. It consumes a
//! [`Transport`] for outbound sends, and a transport driver feeds inbound
//! updates to the [`BotService`](crate::service::BotService). Retry policy,
//! connection management and wire formats all stay on the transport side of
//! this trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportResult;

/// A send-capable handle to the chat platform.
///
/// Implementations must tolerate overlapping calls from multiple in-flight
/// handlers; the router issues sends concurrently and never serializes them.
///
/// # Example
///
/// ```rust,ignore
/// struct ConsoleTransport;
///
/// #[async_trait]
/// impl Transport for ConsoleTransport {
///     fn name(&self) -> &str {
///         "console"
///     }
///
///     async fn send_text(&self, chat_id: i64, text: &str) -> TransportResult<()> {
///         println!("[chat {chat_id}] {text}");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the transport's short name (e.g. "telegram"), used in logs.
    fn name(&self) -> &str;

    /// Sends a text message to the given chat.
    ///
    /// Failures are reported to the caller but are not retried by the
    /// routing core.
    async fn send_text(&self, chat_id: i64, text: &str) -> TransportResult<()>;
}

/// A shared, type-erased transport handle.
pub type BoxedTransport = Arc<dyn Transport>;
