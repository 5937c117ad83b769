//! chatline - composer input handling for a Matrix chat client.
//!
//! Turns a line of composer text into a validated slash-command invocation,
//! and the text after an `@` trigger into ranked mention candidates.

pub mod actions;
pub mod command;
pub mod config;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod mention;
pub mod search;

pub use actions::{
    ActionError, ActionResult, ClientContext, DeviceLookup, MemberProvider, RoomActions,
    RoomContext, TracingActions,
};
pub use command::{
    parse_input, parse_users_and_reason, Command, CommandInput, CommandRegistry, ParsedArguments,
};
pub use config::Config;
pub use error::{ChatlineError, Result};
pub use mention::{
    MentionEditor, MentionEvent, MentionItem, MentionNode, MentionQuery, MentionSelection,
    MentionSession, RoomMember, SessionState, TextRange,
};
pub use search::{search, SearchOptions, SearchResult};
