//! The router: classification and dispatch engine over the event bus.
//!
//! The router subscribes once to the bus, fans events out to every
//! registered stream handler (each on its own subscription and task), and
//! runs the command pipeline for command-shaped events:
//!
//! ```text
//! ┌───────────┐     ┌────────────┐ classify ─ parse ─ resolve ┌───────────┐
//! │ transport │────▶│  EventBus  │───────────────────────────▶│  handler  │
//! │  driver   │     │ (multicast)│──▶ stream handler task     │   task    │
//! └───────────┘     └────────────┘──▶ stream handler task     └───────────┘
//! ```
//!
//! Every handler invocation runs in its own spawned task: the dispatch loop
//! never waits for handler N to finish before receiving event N+1, so
//! completion order across events is unspecified. Any handler failure is
//! caught at that task's boundary, logged, and answered with an error reply
//! — it can never terminate the router's subscription.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, debug, error, info, span, trace, warn};

use crate::error::DispatchError;
use crate::event::{ChatEvent, ParsedCommand};
use crate::handler::{
    BoxedStreamHandler, CommandHandler, Outcome, StreamHandler, into_stream_handler,
};
use crate::parse::parse_command;
use crate::registry::CommandRegistry;
use crate::service::BotService;

/// The event classification/dispatch engine.
///
/// Handlers are registered while wiring the bot up; calling
/// [`start_routing`](Self::start_routing) consumes the router, after which
/// the registries are immutable. The router itself is stateless across
/// events — all per-event state lives in the [`ChatEvent`] being processed.
pub struct Router {
    service: Arc<BotService>,
    commands: CommandRegistry,
    stream_handlers: Vec<BoxedStreamHandler>,
}

impl Router {
    /// Creates a router over the given service.
    pub fn new(service: Arc<BotService>) -> Self {
        Self {
            service,
            commands: CommandRegistry::new(),
            stream_handlers: Vec::new(),
        }
    }

    /// Registers a command handler under the given markerless name.
    ///
    /// Last registration wins for duplicate names.
    pub fn register_command<H>(&mut self, name: impl Into<String>, handler: H)
    where
        H: CommandHandler + 'static,
    {
        self.commands.register(name, handler);
    }

    /// Registers an independent observer of the full event stream.
    pub fn register_stream_handler<H>(&mut self, handler: H)
    where
        H: StreamHandler + 'static,
    {
        self.stream_handlers.push(into_stream_handler(handler));
    }

    /// Returns the number of registered commands.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Starts consuming the event bus.
    ///
    /// Spawns one task per stream handler (each with its own subscription)
    /// plus the dispatch task, and returns a handle for stopping them.
    /// Consuming `self` makes a second start unrepresentable.
    pub fn start_routing(self) -> RouterHandle {
        let token = CancellationToken::new();
        let mut tasks = Vec::with_capacity(self.stream_handlers.len() + 1);

        for (index, handler) in self.stream_handlers.into_iter().enumerate() {
            let events = self.service.subscribe();
            let stop = token.clone();
            tasks.push(tokio::spawn(async move {
                tokio::select! {
                    () = stop.cancelled() => {}
                    () = handler.run(events) => {
                        debug!(index, "stream handler finished");
                    }
                }
            }));
        }

        let commands = Arc::new(self.commands);
        let service = self.service;
        let mut events = service.subscribe();
        let stop = token.clone();
        tasks.push(tokio::spawn(async move {
            info!(commands = commands.len(), "routing started");
            loop {
                tokio::select! {
                    () = stop.cancelled() => break,
                    next = events.next() => {
                        let Some(event) = next else { break };
                        dispatch(&service, &commands, event);
                    }
                }
            }
            info!("routing stopped");
        }));

        RouterHandle { token, tasks }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("commands", &self.commands)
            .field("stream_handlers", &self.stream_handlers.len())
            .finish()
    }
}

/// Runs the per-event command pipeline: classify, parse, resolve, execute.
///
/// Synchronous up to handler execution; the execution itself (and any
/// outbound reply) is spawned so the dispatch loop stays free to receive
/// the next event.
fn dispatch(service: &Arc<BotService>, commands: &Arc<CommandRegistry>, event: ChatEvent) {
    if !event.is_command_shaped() {
        // Plain content. Stream handlers see it through their own
        // subscriptions; the dispatch pipeline is done with it.
        return;
    }

    let parsed = event
        .text()
        .and_then(|text| parse_command(text, commands, event.command_tag()))
        .or_else(|| event.command_tag().map(ParsedCommand::bare));

    let Some(parsed) = parsed else {
        // DispatchError::Parse — command-shaped text that names no known
        // command is treated as plain content, never surfaced.
        trace!(chat_id = event.chat_id(), "command-shaped text did not parse");
        return;
    };

    let name = parsed.command.clone();
    let Some(handler) = commands.resolve(&name) else {
        let err = DispatchError::UnknownCommand { command: name };
        warn!(chat_id = event.chat_id(), error = %err, "no handler for command");
        send_reply(service, event.chat_id(), err);
        return;
    };

    let event = event.with_parsed(parsed);
    let chat_id = event.chat_id();
    let service = Arc::clone(service);
    let command_span = span!(Level::DEBUG, "command", name = %name, chat_id);
    tokio::spawn(
        async move {
            debug!("executing handler");
            match handler.call(event).await {
                Ok(Outcome::Done) => trace!("handler completed"),
                Ok(Outcome::Suppressed) => trace!("handler suppressed further effects"),
                Err(source) => {
                    let err = DispatchError::Handler {
                        command: name,
                        source,
                    };
                    error!(error = %err, "command handler failed");
                    send_reply(&service, chat_id, err);
                }
            }
        }
        .instrument(command_span),
    );
}

/// Delivers the user-visible reply for a dispatch failure, if it has one.
///
/// Spawned so neither the dispatch loop nor a failing handler's task waits
/// on the transport. A failed send is logged and not retried.
fn send_reply(service: &Arc<BotService>, chat_id: i64, err: DispatchError) {
    let Some(reply) = err.user_reply() else {
        return;
    };
    let service = Arc::clone(service);
    tokio::spawn(async move {
        if let Err(send_err) = service.send_text(chat_id, &reply).await {
            error!(chat_id, error = %send_err, "failed to deliver error reply");
        }
    });
}

// =============================================================================
// RouterHandle
// =============================================================================

/// Handle to a running router.
///
/// Stopping cancels the dispatch loop and the stream handler tasks.
/// Handler invocations already in flight are not preempted — a long-running
/// handler only delays its own completion.
pub struct RouterHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl RouterHandle {
    /// Signals the routing tasks to stop.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for the routing tasks to finish.
    pub async fn join(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

impl std::fmt::Debug for RouterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterHandle")
            .field("tasks", &self.tasks.len())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HandlerError, TransportResult};
    use crate::event::{RawUpdate, SenderProfile};
    use crate::transport::Transport;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    /// Transport that records every outbound send.
    struct RecordingTransport {
        sent: Mutex<Vec<(i64, String)>>,
    }

    impl RecordingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<(i64, String)> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send_text(&self, chat_id: i64, text: &str) -> TransportResult<()> {
            self.sent.lock().push((chat_id, text.to_owned()));
            Ok(())
        }
    }

    fn update(chat_id: i64, text: &str) -> RawUpdate {
        RawUpdate::text(chat_id, SenderProfile::new(chat_id * 100, "Ada"), text)
    }

    async fn wait_for_sends(transport: &Arc<RecordingTransport>, count: usize) {
        timeout(Duration::from_secs(2), async {
            loop {
                if transport.sent.lock().len() >= count {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for transport sends");
    }

    #[tokio::test]
    async fn registered_command_is_invoked_once_with_parsed_args() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let mut router = Router::new(Arc::clone(&service));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_handler = Arc::clone(&calls);
        router.register_command("echo", move |event: ChatEvent| {
            let tx = tx.clone();
            let calls = Arc::clone(&calls_in_handler);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tx.send(event.parsed().cloned()).unwrap();
                Ok(Outcome::Done)
            }
        });

        let handle = router.start_routing();
        service.handle_update(update(1, "/echo hello world"));

        let parsed = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(parsed.command, "echo");
        assert_eq!(parsed.args, vec!["hello", "world"]);
        assert_eq!(parsed.raw_args, "hello world");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(transport.sent().is_empty());

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn plain_text_triggers_no_lookup_and_no_reply() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let mut router = Router::new(Arc::clone(&service));

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_handler = Arc::clone(&calls);
        let (tx, mut rx) = mpsc::unbounded_channel();
        router.register_command("echo", move |_event: ChatEvent| {
            let tx = tx.clone();
            let calls = Arc::clone(&calls_in_handler);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tx.send(()).unwrap();
                Ok(Outcome::Done)
            }
        });

        let handle = router.start_routing();
        service.handle_update(update(1, "hello there"));
        // Sentinel command: once this one completes, the plain-text event
        // has long been classified.
        service.handle_update(update(1, "/echo sentinel"));

        timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(transport.sent().is_empty());

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn unknown_pretagged_command_gets_exactly_one_not_found_reply() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let router = Router::new(Arc::clone(&service));

        let handle = router.start_routing();
        service.handle_command("unknown", update(7, "/unknown foo"));

        wait_for_sends(&transport, 1).await;
        assert_eq!(
            transport.sent(),
            vec![(7, "command /unknown not found".to_owned())]
        );

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn unregistered_free_text_command_is_silently_ignored() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let mut router = Router::new(Arc::clone(&service));

        let (tx, mut rx) = mpsc::unbounded_channel();
        router.register_command("echo", move |_event: ChatEvent| {
            let tx = tx.clone();
            async move {
                tx.send(()).unwrap();
                Ok(Outcome::Done)
            }
        });

        let handle = router.start_routing();
        service.handle_update(update(1, "/unknown foo"));
        service.handle_update(update(1, "/echo sentinel"));

        timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert!(transport.sent().is_empty());

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn failing_handler_replies_and_does_not_stop_routing() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let mut router = Router::new(Arc::clone(&service));

        router.register_command("boom", |_event: ChatEvent| async {
            Err::<Outcome, _>(HandlerError::new("kaput"))
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        router.register_command("echo", move |_event: ChatEvent| {
            let tx = tx.clone();
            async move {
                tx.send(()).unwrap();
                Ok(Outcome::Done)
            }
        });

        let handle = router.start_routing();
        service.handle_update(update(3, "/boom"));
        service.handle_update(update(4, "/echo still alive"));

        timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        wait_for_sends(&transport, 1).await;
        assert_eq!(
            transport.sent(),
            vec![(3, "error executing /boom: kaput".to_owned())]
        );

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn concurrent_commands_both_complete() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let mut router = Router::new(Arc::clone(&service));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let slow_tx = tx.clone();
        router.register_command("slow", move |event: ChatEvent| {
            let tx = slow_tx.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                tx.send(("slow", event.parsed().unwrap().raw_args.clone()))
                    .unwrap();
                Ok(Outcome::Done)
            }
        });
        router.register_command("fast", move |event: ChatEvent| {
            let tx = tx.clone();
            async move {
                tx.send(("fast", event.parsed().unwrap().raw_args.clone()))
                    .unwrap();
                Ok(Outcome::Done)
            }
        });

        let handle = router.start_routing();
        service.handle_update(update(1, "/slow a"));
        service.handle_update(update(2, "/fast b"));

        // Both complete exactly once with their own arguments; completion
        // order is deliberately not asserted.
        let mut completions = Vec::new();
        for _ in 0..2 {
            completions.push(timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap());
        }
        completions.sort_unstable();
        assert_eq!(
            completions,
            vec![("fast", "b".to_owned()), ("slow", "a".to_owned())]
        );

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn suppressed_outcome_produces_no_effect() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let mut router = Router::new(Arc::clone(&service));

        let (tx, mut rx) = mpsc::unbounded_channel();
        router.register_command("quiet", move |_event: ChatEvent| {
            let tx = tx.clone();
            async move {
                tx.send(()).unwrap();
                Ok(Outcome::Suppressed)
            }
        });

        let handle = router.start_routing();
        service.handle_update(update(1, "/quiet"));

        timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(transport.sent().is_empty());

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn pretagged_command_synthesizes_empty_args() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let mut router = Router::new(Arc::clone(&service));

        let (tx, mut rx) = mpsc::unbounded_channel();
        router.register_command("start", move |event: ChatEvent| {
            let tx = tx.clone();
            async move {
                tx.send(event.parsed().cloned().unwrap()).unwrap();
                Ok(Outcome::Done)
            }
        });

        let handle = router.start_routing();
        service.handle_command("start", update(1, "/start"));

        let parsed = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(parsed, ParsedCommand::bare("start"));

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn stream_handlers_see_every_event_independently() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let mut router = Router::new(Arc::clone(&service));

        router.register_command("echo", |_event: ChatEvent| async {
            Ok::<_, HandlerError>(Outcome::Done)
        });

        // First observer dies on its first event; the second must still
        // see the whole stream.
        router.register_stream_handler(|mut events: crate::bus::EventStream| async move {
            let _ = events.next().await;
            panic!("observer gave up");
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        router.register_stream_handler(move |mut events: crate::bus::EventStream| {
            let tx = tx.clone();
            async move {
                while let Some(event) = events.next().await {
                    tx.send(event.text().map(str::to_owned)).unwrap();
                }
            }
        });

        let handle = router.start_routing();
        service.handle_update(update(1, "plain text"));
        service.handle_update(update(1, "/echo command"));

        let mut seen = Vec::new();
        for _ in 0..2 {
            seen.push(
                timeout(Duration::from_secs(1), rx.recv())
                    .await
                    .unwrap()
                    .unwrap(),
            );
        }
        assert_eq!(
            seen,
            vec![
                Some("plain text".to_owned()),
                Some("/echo command".to_owned())
            ]
        );

        handle.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn stop_ends_the_dispatch_loop() {
        let transport = RecordingTransport::new();
        let service = Arc::new(BotService::new(transport.clone()));
        let router = Router::new(Arc::clone(&service));

        let handle = router.start_routing();
        assert!(!handle.is_stopped());
        handle.stop();
        assert!(handle.is_stopped());
        timeout(Duration::from_secs(1), handle.join())
            .await
            .expect("routing tasks did not stop");
    }
}
