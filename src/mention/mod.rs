//! Mention autocomplete.
//!
//! This module turns the text typed after an `@` trigger into a ranked list
//! of room members and commits the chosen mention into the editor:
//! - Member search strings and display-name resolution
//! - The session state machine with its forced-completion rules

mod member;
mod session;

pub use member::{
    member_search_strings, mx_id_to_name, resolve_display_name, DisplayNameStrategy, RoomMember,
    DEFAULT_DISPLAY_NAME_POLICY,
};
pub use session::{
    MentionEditor, MentionEvent, MentionItem, MentionNode, MentionQuery, MentionSelection,
    MentionSession, SearchTicket, SessionState, TextRange, ROOM_MENTION_KEYWORD,
    ROOM_MENTION_LABEL,
};
