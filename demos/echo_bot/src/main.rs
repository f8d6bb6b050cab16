//! Echo Bot Demo
//!
//! A console-driven bot demonstrating the Rivet router: commands are
//! dispatched by name to the handlers below, while a stream handler
//! observes the full event stream independently.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot
//! ```
//!
//! Then type messages on stdin:
//!
//! ```text
//! /start              greeting (delivered as a transport command shortcut)
//! /echo some text     echoes the text back
//! /delay 500          waits 500ms before completing
//! /buffer 16          allocates and fills a 16-byte buffer
//! /check_users 1,2,3  intersects the ids with the configured allow-list
//! anything else       observed by the plain-text stream handler
//! ```

mod buffer;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use rivet::{
    BotService, BoxedTransport, ChatEvent, EventStream, HandlerError, HandlerResult, Outcome,
    Router, Runtime,
};

use crate::transport::ConsoleTransport;

// ============================================================================
// Command Handlers
// ============================================================================

/// `/start` — greets the sender.
///
/// Delivered through the transport's command shortcut, so its parsed
/// command is synthesized with empty arguments.
async fn start_handler(event: ChatEvent) -> HandlerResult {
    let greeting = format!("Welcome, {}!", event.sender().first_name);
    event.reply(&greeting).await?;
    Ok(Outcome::Done)
}

/// `/echo <text>` — sends the argument text back.
async fn echo_handler(event: ChatEvent) -> HandlerResult {
    let raw_args = event.parsed().map(|p| p.raw_args.as_str()).unwrap_or("");

    if raw_args.is_empty() {
        event.reply("Please provide text to echo.").await?;
        return Ok(Outcome::Suppressed);
    }

    event.reply(&format!("You said: {raw_args}")).await?;
    Ok(Outcome::Done)
}

/// `/delay [ms]` — waits before completing, default 1000ms.
///
/// Demonstrates that a slow handler delays only its own completion; other
/// commands keep dispatching while it sleeps.
async fn delay_handler(event: ChatEvent) -> HandlerResult {
    let millis = match event.parsed().and_then(|p| p.args.first()) {
        Some(arg) => arg.parse::<i64>().unwrap_or(-1),
        None => 1000,
    };

    if millis <= 0 {
        event
            .reply("Delay must be a positive number of milliseconds.")
            .await?;
        return Ok(Outcome::Suppressed);
    }

    debug!(millis, "delaying");
    tokio::time::sleep(Duration::from_millis(millis as u64)).await;
    debug!(millis, "delay elapsed");
    Ok(Outcome::Done)
}

/// `/buffer [size]` — allocates and fills a buffer, default 10 bytes.
async fn buffer_handler(event: ChatEvent) -> HandlerResult {
    let size = match event.parsed().and_then(|p| p.args.first()) {
        Some(arg) => arg.parse::<i64>().unwrap_or(-1),
        None => 10,
    };

    if size <= 0 {
        event.reply("Buffer size must be a positive number.").await?;
        return Ok(Outcome::Suppressed);
    }

    let mut buf = buffer::allocate_buffer(size as usize);
    buffer::fill_buffer(&mut buf, 0xAA, 0, None).map_err(|e| HandlerError::new(e.to_string()))?;

    let reply = format!(
        "Buffer allocated: {} bytes, filled with 0xaa. First 10 bytes: {}",
        buf.len(),
        buffer::hex_preview(&buf, 10)
    );
    event.reply(&reply).await?;
    Ok(Outcome::Done)
}

/// `/check_users <id,id,...>` — intersects the given ids with the static
/// allow-list from configuration.
async fn check_users(event: ChatEvent, allowed: &[i64]) -> HandlerResult {
    let input = event.parsed().map(|p| p.raw_args.as_str()).unwrap_or("");
    let ids = parse_ids(input);

    if ids.is_empty() {
        event
            .reply("Please provide ids separated by commas. Example: /check_users 123456, 789012")
            .await?;
        return Ok(Outcome::Suppressed);
    }

    let found = known_ids(&ids, allowed);

    let reply = if found.is_empty() {
        "None of the provided ids belong to known users.".to_owned()
    } else {
        let list = found
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Found {} known id(s): {}.", found.len(), list)
    };

    event.reply(&reply).await?;
    Ok(Outcome::Done)
}

/// Parses a comma-separated id list, dropping anything non-numeric.
fn parse_ids(input: &str) -> Vec<i64> {
    input
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// Returns the ids that appear in the allow-list, in input order.
fn known_ids(ids: &[i64], allowed: &[i64]) -> Vec<i64> {
    ids.iter().copied().filter(|id| allowed.contains(id)).collect()
}

// ============================================================================
// Stream Handlers
// ============================================================================

/// Observes the full event stream and logs plain text messages.
async fn plain_text_logger(mut events: EventStream) {
    while let Some(event) = events.next().await {
        if let Some(text) = event.text()
            && !text.starts_with('/')
        {
            info!(
                chat_id = event.chat_id(),
                sender = %event.sender().first_name,
                text,
                "plain text message"
            );
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = Runtime::new();
    let config = runtime.config().clone();

    let transport: BoxedTransport = Arc::new(ConsoleTransport);
    let service = Arc::new(BotService::with_capacity(
        transport,
        config.router.bus_capacity,
    ));

    let mut router = Router::new(Arc::clone(&service));
    router.register_command("start", start_handler);
    router.register_command("echo", echo_handler);
    router.register_command("delay", delay_handler);
    router.register_command("buffer", buffer_handler);

    let allowed = Arc::new(config.bot.allowed_users.clone());
    router.register_command("check_users", move |event: ChatEvent| {
        let allowed = Arc::clone(&allowed);
        async move { check_users(event, &allowed).await }
    });

    router.register_stream_handler(plain_text_logger);

    info!(
        commands = router.command_count(),
        allowed_users = config.bot.allowed_users.len(),
        "echo bot configured"
    );

    // `/start` arrives through the transport's pre-filtered command
    // subscription; everything else is free text parsed by the router.
    tokio::spawn(transport::drive_stdin(
        Arc::clone(&service),
        vec!["start".to_owned()],
    ));

    runtime.run(router).await?;
    Ok(())
}
