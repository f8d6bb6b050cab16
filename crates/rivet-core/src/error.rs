//! Unified error types for the Rivet core crate.
//!
//! Failures are modelled as a closed set and converted to user-visible
//! behaviour in exactly one place, the router's dispatch boundary (see
//! [`DispatchError::user_reply`]). Nothing in this crate lets an error
//! unwind past the dispatch loop.

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur when talking to the chat transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Sending a message to a chat failed.
    #[error("failed to send to chat {chat_id}: {reason}")]
    SendFailed {
        /// The destination chat.
        chat_id: i64,
        /// Reason for failure.
        reason: String,
    },

    /// The transport connection is gone.
    #[error("transport disconnected: {reason}")]
    Disconnected {
        /// Reason for disconnection.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Handler Errors
// =============================================================================

/// Error produced by a command handler.
///
/// Handlers report failure through this type; the router catches it at the
/// per-invocation boundary, logs it, and turns it into an error reply for
/// the originating chat.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransportError> for HandlerError {
    fn from(err: TransportError) -> Self {
        Self::new(err.to_string())
    }
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// The closed set of failures the router can observe for a single event.
///
/// Only [`DispatchError::UnknownCommand`] and [`DispatchError::Handler`]
/// surface to the user; a `Parse` failure silently demotes the event to
/// plain content and transport failures are logged without retry.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Text looked like a command but did not parse as one.
    #[error("command-shaped text did not parse")]
    Parse,

    /// The parsed command name has no registered handler.
    #[error("command /{command} not found")]
    UnknownCommand {
        /// The markerless command name.
        command: String,
    },

    /// A registered handler failed.
    #[error("error executing /{command}: {source}")]
    Handler {
        /// The markerless command name.
        command: String,
        /// The handler's error.
        #[source]
        source: HandlerError,
    },

    /// The transport rejected an outbound send.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchError {
    /// Returns the user-visible reply for this failure, if it has one.
    pub fn user_reply(&self) -> Option<String> {
        match self {
            Self::UnknownCommand { .. } | Self::Handler { .. } => Some(self.to_string()),
            Self::Parse | Self::Transport(_) => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_reply_text() {
        let err = DispatchError::UnknownCommand {
            command: "unknown".into(),
        };
        assert_eq!(err.user_reply().unwrap(), "command /unknown not found");
    }

    #[test]
    fn handler_failure_reply_text() {
        let err = DispatchError::Handler {
            command: "echo".into(),
            source: HandlerError::new("boom"),
        };
        assert_eq!(err.user_reply().unwrap(), "error executing /echo: boom");
    }

    #[test]
    fn silent_failures_have_no_reply() {
        assert!(DispatchError::Parse.user_reply().is_none());
        let err = DispatchError::Transport(TransportError::SendFailed {
            chat_id: 7,
            reason: "offline".into(),
        });
        assert!(err.user_reply().is_none());
    }
}
