//! Slash commands.
//!
//! This module turns a composer line into a validated command invocation:
//! - Line classification (message, known command, unknown command)
//! - Target/reason tokenizing for moderation commands
//! - The command catalogue and its dispatcher

mod args;
mod input;
mod registry;

pub use args::{parse_ids, parse_users_and_reason, ParsedArguments, REASON_DELIMITER};
pub use input::{
    complete_command, compose_message, format_help, parse_input, CommandInput, MessageKind,
    OutgoingMessage, SHRUG,
};
pub use registry::{Command, CommandContent, CommandRegistry};
