//! Command registry: the name-to-handler mapping used for dispatch.
//!
//! The registry is populated while the bot is being wired up and becomes
//! read-only once routing starts — the router moves it behind an `Arc`, so
//! lookups during routing are lock-free by construction.

use std::collections::HashMap;

use tracing::debug;

use crate::handler::{BoxedCommandHandler, CommandHandler, into_handler};

/// Mapping from command name to handler.
///
/// Names are case-sensitive and carry no marker (`"echo"`, not `"/echo"`).
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, BoxedCommandHandler>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for the given command name.
    ///
    /// Registering a name twice replaces the earlier handler; the last
    /// registration wins.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H)
    where
        H: CommandHandler + 'static,
    {
        let name = name.into();
        if self.handlers.insert(name.clone(), into_handler(handler)).is_some() {
            debug!(command = %name, "replacing previously registered handler");
        }
    }

    /// Resolves a handler by command name.
    pub fn resolve(&self, name: &str) -> Option<BoxedCommandHandler> {
        self.handlers.get(name).cloned()
    }

    /// Whether a handler is registered under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CommandRegistry")
            .field("commands", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::event::{ChatEvent, RawUpdate, SenderProfile};
    use crate::handler::Outcome;
    use crate::transport::{BoxedTransport, Transport};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    fn event() -> ChatEvent {
        let transport: BoxedTransport = Arc::new(NullTransport);
        ChatEvent::from_update(
            RawUpdate::text(1, SenderProfile::new(2, "Ada"), "/x"),
            transport,
        )
    }

    #[test]
    fn resolve_unknown_name_is_none() {
        let registry = CommandRegistry::new();
        assert!(registry.resolve("echo").is_none());
        assert!(!registry.contains("echo"));
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let counter = Arc::new(AtomicUsize::new(0));

        let mut registry = CommandRegistry::new();
        registry.register("echo", |_event: ChatEvent| async {
            Ok::<_, HandlerError>(Outcome::Done)
        });

        let c = Arc::clone(&counter);
        registry.register("echo", move |_event: ChatEvent| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Done)
            }
        });

        assert_eq!(registry.len(), 1);
        registry.resolve("echo").unwrap().call(event()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
