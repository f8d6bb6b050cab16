//! Canonical event model for the Rivet framework.
//!
//! Every inbound platform update is normalized into a [`ChatEvent`] before it
//! reaches the bus, so consumers never see transport-specific shapes. The
//! normalization functions on `ChatEvent` are the single place that knows how
//! a [`RawUpdate`] maps onto the canonical form.
//!
//! Events are immutable values: routing never mutates an event in place, it
//! derives a new one (see [`ChatEvent::with_parsed`]).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::transport::BoxedTransport;

// =============================================================================
// Sender Profile
// =============================================================================

/// Transport-side profile of a message sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    /// The sender's platform user id.
    pub id: i64,
    /// First name as reported by the platform.
    pub first_name: String,
    /// Last name, if the platform provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Handle/username, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Whether the sender is itself a bot.
    #[serde(default)]
    pub is_bot: bool,
}

impl SenderProfile {
    /// Creates a minimal profile with just an id and a first name.
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
            is_bot: false,
        }
    }
}

// =============================================================================
// Raw Updates
// =============================================================================

/// Payload kind of one raw platform update.
///
/// This mirrors the update kinds the transport driver subscribes to. Only
/// text payloads participate in command routing; the other kinds flow to
/// stream handlers unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// A plain text message.
    Text(String),
    /// A document/file attachment.
    Document,
    /// A photo.
    Photo,
    /// A sticker.
    Sticker,
    /// An audio clip.
    Audio,
    /// A video clip.
    Video,
}

/// One raw inbound update, as handed over by the transport driver.
///
/// Built by the transport side and consumed only by
/// [`BotService`](crate::service::BotService) normalization; nothing past
/// the bus ever sees this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUpdate {
    /// The chat the update originated from.
    pub chat_id: i64,
    /// Profile of the sender.
    pub from: SenderProfile,
    /// The update payload.
    pub kind: UpdateKind,
}

impl RawUpdate {
    /// Creates a text update.
    pub fn text(chat_id: i64, from: SenderProfile, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            from,
            kind: UpdateKind::Text(text.into()),
        }
    }
}

// =============================================================================
// Parsed Commands
// =============================================================================

/// Structured decomposition of command-shaped text.
///
/// Immutable once created; parsing the same text twice yields equal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The command name, without the leading marker.
    pub command: String,
    /// Whitespace-delimited tokens following the command, in order.
    pub args: Vec<String>,
    /// The command text with the leading command token removed, trimmed.
    pub raw_args: String,
}

impl ParsedCommand {
    /// Creates a command with no arguments.
    ///
    /// Used when a transport shortcut pre-tags an event with a command name
    /// and there is no free text to parse.
    pub fn bare(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            raw_args: String::new(),
        }
    }
}

// =============================================================================
// Chat Events
// =============================================================================

/// The canonical unit flowing through the event bus.
///
/// A `ChatEvent` is cheap to clone: the sender profile and transport handle
/// are shared behind `Arc`s. Classification is carried by two optional
/// fields set by the normalization functions, never both at once:
///
/// - `text` — the event is a plain text message (which may still turn out
///   to be a command during routing),
/// - `command` — the transport delivered the event through a pre-filtered
///   command shortcut and tagged it with the command name.
///
/// `parsed` is attached only by the router, via [`with_parsed`](Self::with_parsed).
#[derive(Clone)]
pub struct ChatEvent {
    chat_id: i64,
    sender_id: i64,
    text: Option<String>,
    command: Option<String>,
    parsed: Option<ParsedCommand>,
    from: Arc<SenderProfile>,
    transport: BoxedTransport,
}

impl ChatEvent {
    /// Normalizes a raw update into a canonical event.
    ///
    /// This is the per-kind adapter function: text payloads populate
    /// [`text`](Self::text), every other kind produces an event with
    /// neither text nor command tag.
    pub fn from_update(update: RawUpdate, transport: BoxedTransport) -> Self {
        let text = match update.kind {
            UpdateKind::Text(text) => Some(text),
            _ => None,
        };

        Self {
            chat_id: update.chat_id,
            sender_id: update.from.id,
            text,
            command: None,
            parsed: None,
            from: Arc::new(update.from),
            transport,
        }
    }

    /// Normalizes a transport command shortcut into a canonical event.
    ///
    /// The event carries only the pre-tagged command name; free-text parsing
    /// is bypassed for it during routing.
    pub fn from_command(name: impl Into<String>, update: RawUpdate, transport: BoxedTransport) -> Self {
        Self {
            chat_id: update.chat_id,
            sender_id: update.from.id,
            text: None,
            command: Some(name.into()),
            parsed: None,
            from: Arc::new(update.from),
            transport,
        }
    }

    /// Returns the chat this event originated from.
    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Returns the sender's user id.
    pub fn sender_id(&self) -> i64 {
        self.sender_id
    }

    /// Returns the message text, if this is a text event.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the pre-tagged command name, if the transport set one.
    pub fn command_tag(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Returns the parsed command attached during routing, if any.
    pub fn parsed(&self) -> Option<&ParsedCommand> {
        self.parsed.as_ref()
    }

    /// Returns the sender's transport profile.
    pub fn sender(&self) -> &SenderProfile {
        &self.from
    }

    /// Returns the send-capable transport handle carried by this event.
    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }

    /// Whether this event qualifies for the command dispatch pipeline.
    ///
    /// True when the text starts with the command marker or the transport
    /// pre-tagged a command name.
    pub fn is_command_shaped(&self) -> bool {
        self.command.is_some()
            || self
                .text
                .as_deref()
                .is_some_and(|t| t.starts_with(crate::parse::COMMAND_MARKER))
    }

    /// Derives a new event with the given parsed command attached.
    pub fn with_parsed(mut self, parsed: ParsedCommand) -> Self {
        self.parsed = Some(parsed);
        self
    }

    /// Sends a text reply to this event's chat.
    pub async fn reply(&self, text: &str) -> crate::error::TransportResult<()> {
        self.transport.send_text(self.chat_id, text).await
    }
}

impl std::fmt::Debug for ChatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEvent")
            .field("chat_id", &self.chat_id)
            .field("sender_id", &self.sender_id)
            .field("text", &self.text)
            .field("command", &self.command)
            .field("parsed", &self.parsed)
            .field("transport", &self.transport.name())
            .finish()
    }
}
