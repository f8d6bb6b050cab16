//! Console transport: stdin in, stdout out.
//!
//! Each line typed on stdin becomes one raw update from a fixed console
//! chat. Lines whose first token names a configured shortcut are delivered
//! through [`BotService::handle_command`], the way a chat platform's
//! pre-filtered command subscription would deliver them; everything else
//! goes through the ordinary update path.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use rivet::{BotService, RawUpdate, SenderProfile, Transport, TransportResult};

/// The chat id all console input is attributed to.
pub const CONSOLE_CHAT_ID: i64 = 1;

/// The user id of the console "sender".
pub const CONSOLE_USER_ID: i64 = 42;

/// A transport that prints outbound messages to stdout.
pub struct ConsoleTransport;

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> TransportResult<()> {
        println!("[chat {chat_id}] {text}");
        Ok(())
    }
}

/// Profile of the console sender.
pub fn console_user() -> SenderProfile {
    SenderProfile {
        id: CONSOLE_USER_ID,
        first_name: "Console".to_owned(),
        last_name: None,
        username: Some("console".to_owned()),
        is_bot: false,
    }
}

/// Reads stdin line by line and feeds the service until EOF.
pub async fn drive_stdin(service: Arc<BotService>, shortcuts: Vec<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("console transport ready, type messages or /commands");

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let update = RawUpdate::text(CONSOLE_CHAT_ID, console_user(), line);
        match shortcut_name(line, &shortcuts) {
            Some(name) => service.handle_command(name, update),
            None => service.handle_update(update),
        }
    }

    info!("stdin closed, console transport stopping");
}

/// Returns the shortcut name matching the line's first token, if any.
fn shortcut_name<'a>(line: &str, shortcuts: &'a [String]) -> Option<&'a str> {
    let first = line.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    shortcuts
        .iter()
        .find(|s| s.as_str() == name)
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcuts() -> Vec<String> {
        vec!["start".to_owned()]
    }

    #[test]
    fn shortcut_matches_first_token() {
        assert_eq!(shortcut_name("/start", &shortcuts()), Some("start"));
        assert_eq!(shortcut_name("/start now", &shortcuts()), Some("start"));
    }

    #[test]
    fn non_shortcuts_pass_through() {
        assert_eq!(shortcut_name("/echo hi", &shortcuts()), None);
        assert_eq!(shortcut_name("plain text", &shortcuts()), None);
        assert_eq!(shortcut_name("/startle", &shortcuts()), None);
    }
}
