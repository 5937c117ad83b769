//! Composer line classification, help text and command completion.

use super::registry::Command;

/// Text sent for `/shrug`.
pub const SHRUG: &str = "¯\\_(ツ)_/¯";

/// Result of classifying a composer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    /// Plain message text.
    Message(String),
    /// A known command and the raw text after its name.
    Command {
        /// The command.
        command: Command,
        /// Text after the name and its separating space, unmodified.
        payload: String,
    },
    /// A slash line whose name is not in the catalogue.
    Unknown {
        /// Name as typed.
        name: String,
        /// Text after the name.
        payload: String,
    },
}

/// Classify a composer line.
///
/// Lines starting with `/` are commands; the name runs up to the first
/// space and must match exactly (case-sensitive). `//` escapes a literal
/// leading slash. Message lines are trimmed at both ends; command payloads
/// keep their inner and trailing spaces.
pub fn parse_input(input: &str) -> CommandInput {
    let line = input.trim_start().trim_end_matches(['\r', '\n']);

    if let Some(escaped) = line.strip_prefix("//") {
        return CommandInput::Message(format!("/{}", escaped.trim_end()));
    }

    let Some(without_slash) = line.strip_prefix('/') else {
        return CommandInput::Message(line.trim_end().to_string());
    };

    let (name, payload) = without_slash
        .split_once(' ')
        .unwrap_or((without_slash, ""));

    match Command::from_name(name) {
        Some(command) => CommandInput::Command {
            command,
            payload: payload.to_string(),
        },
        None => CommandInput::Unknown {
            name: name.to_string(),
            payload: payload.to_string(),
        },
    }
}

/// How a message-style command is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Regular text.
    Text,
    /// Action ("* user waves").
    Emote,
    /// Bot-style notice.
    Notice,
}

/// Message produced by a message-style command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Message kind.
    pub kind: MessageKind,
    /// Message body.
    pub body: String,
}

/// Build the message a message-style command sends.
///
/// Returns `None` for commands that act instead of sending.
pub fn compose_message(command: Command, payload: &str) -> Option<OutgoingMessage> {
    let (kind, body) = match command {
        Command::Me => (MessageKind::Emote, payload.to_string()),
        Command::Notice => (MessageKind::Notice, payload.to_string()),
        Command::Shrug => {
            let body = if payload.trim().is_empty() {
                SHRUG.to_string()
            } else {
                format!("{SHRUG} {payload}")
            };
            (MessageKind::Text, body)
        }
        _ => return None,
    };
    Some(OutgoingMessage { kind, body })
}

/// Commands whose name starts with `prefix` (a leading `/` is ignored).
pub fn complete_command(prefix: &str) -> Vec<Command> {
    let prefix = prefix.strip_prefix('/').unwrap_or(prefix);
    Command::ALL
        .into_iter()
        .filter(|c| c.name().starts_with(prefix))
        .collect()
}

/// Format the help message for display.
pub fn format_help() -> String {
    let mut lines = Vec::new();
    lines.push("=== Commands ===".to_string());
    lines.push(String::new());

    for command in Command::ALL {
        lines.push(command.to_string());
        lines.push(format!("  {}", command.description()));
    }

    lines.join("\n")
}
