//! Command parsing: pure classification of event text.
//!
//! Parsing is side-effect free and idempotent; the same text always yields
//! a structurally equal [`ParsedCommand`]. Acceptance is deliberately
//! coupled to the registry: text that merely starts with the marker but
//! names no registered command is treated as plain content rather than as
//! an unknown command, so the bot never replies "not found" to text that
//! was not meant for it. Pre-tagged command names (delivered through a
//! transport shortcut) are accepted regardless of registration so that
//! unknown pre-tagged commands can still be answered.

use crate::event::ParsedCommand;
use crate::registry::CommandRegistry;

/// The character that marks command-shaped text.
pub const COMMAND_MARKER: char = '/';

/// Parses command-shaped text into a [`ParsedCommand`].
///
/// Returns `None` when the text is not a command for this bot:
///
/// - it does not start with [`COMMAND_MARKER`],
/// - the candidate name is empty (`"/"` alone),
/// - or the candidate is neither registered nor equal to `pre_tagged`.
///
/// Runs of whitespace act as single separators for `args`; `raw_args`
/// preserves the argument text as written, minus the leading command token.
pub fn parse_command(
    text: &str,
    registry: &CommandRegistry,
    pre_tagged: Option<&str>,
) -> Option<ParsedCommand> {
    if !text.starts_with(COMMAND_MARKER) {
        return None;
    }

    let mut tokens = text.split_whitespace();
    let first = tokens.next()?;
    let command = &first[COMMAND_MARKER.len_utf8()..];
    if command.is_empty() {
        return None;
    }

    if !registry.contains(command) && pre_tagged != Some(command) {
        return None;
    }

    let args: Vec<String> = tokens.map(str::to_owned).collect();
    let raw_args = text[first.len()..].trim().to_owned();

    Some(ParsedCommand {
        command: command.to_owned(),
        args,
        raw_args,
    })
}
