//! Mention autocomplete session.
//!
//! A session starts when the composer sees an `@` trigger and ends when a
//! mention is committed into the editor or the composer closes it. All
//! editor input for the session arrives through [`MentionSession::handle`].

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use super::member::RoomMember;
use super::member_search_strings;
use crate::actions::{ClientContext, MemberProvider, RoomContext};
use crate::identifier::user_id_from_text;
use crate::search::{search, SearchOptions, SearchResult};
use crate::{ChatlineError, Result};

/// Query text that selects a room-wide mention.
pub const ROOM_MENTION_KEYWORD: &str = "room";

/// Label of a room-wide mention.
pub const ROOM_MENTION_LABEL: &str = "@room";

/// Position range in the editor, opaque to the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextRange {
    /// Start offset.
    pub start: usize,
    /// End offset.
    pub end: usize,
}

impl TextRange {
    /// Create a new range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Text typed after the trigger and where it sits in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionQuery {
    /// Query text without the `@` trigger.
    pub text: String,
    /// Range replaced when the mention is committed.
    pub range: TextRange,
}

impl MentionQuery {
    /// Create a new query.
    pub fn new(text: impl Into<String>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }
}

/// One entry of the autocomplete menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionItem {
    /// Room-wide mention, identified by alias or room ID.
    Room(String),
    /// A room member.
    Known(RoomMember),
    /// An identifier built from the query that matched no member.
    Unresolved(String),
}

impl MentionItem {
    /// Identifier the mention points at.
    pub fn identifier(&self) -> &str {
        match self {
            MentionItem::Room(id) | MentionItem::Unresolved(id) => id,
            MentionItem::Known(member) => &member.user_id,
        }
    }

    /// Label shown for the mention.
    pub fn label(&self) -> String {
        match self {
            MentionItem::Room(_) => ROOM_MENTION_LABEL.to_string(),
            MentionItem::Known(member) => member.name(),
            MentionItem::Unresolved(id) => id.clone(),
        }
    }
}

/// The mention a session committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSelection {
    /// Identifier the mention points at.
    pub identifier: String,
    /// Label resolved for the mention.
    pub display_label: String,
    /// Whether the identifier is the acting user or the room itself.
    pub is_self_or_room: bool,
}

/// Mention element inserted into the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionNode {
    /// Identifier the mention points at.
    pub id: String,
    /// Rendered text, always starting with `@`.
    pub name: String,
    /// Render with emphasis (self or room mention).
    pub highlight: bool,
}

impl MentionNode {
    /// Build a node, prefixing the label with `@` if it lacks one.
    pub fn new(id: impl Into<String>, label: &str, highlight: bool) -> Self {
        let name = if label.starts_with('@') {
            label.to_string()
        } else {
            format!("@{label}")
        };
        Self {
            id: id.into(),
            name,
            highlight,
        }
    }

    /// Editor element representation.
    pub fn to_element(&self) -> serde_json::Value {
        json!({
            "type": "mention",
            "id": self.id,
            "name": self.name,
            "highlight": self.highlight,
            "children": [{ "text": "" }],
        })
    }
}

/// Editor insertion surface.
pub trait MentionEditor {
    /// Replace `range` with the mention node.
    fn replace_range(&mut self, range: &TextRange, node: MentionNode);

    /// Move the cursor past the node just inserted.
    fn move_cursor_after(&mut self);
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Open with an empty query.
    Idle,
    /// Query changed, search not applied yet.
    Searching,
    /// Search result matches the current query.
    Ready,
    /// A mention was inserted. Terminal.
    Committed,
    /// Closed without a mention. Terminal.
    Closed,
}

impl SessionState {
    /// Whether the session still accepts input.
    pub fn is_open(&self) -> bool {
        !matches!(self, SessionState::Committed | SessionState::Closed)
    }
}

/// Handle for one search; only the latest one is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Input delivered to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionEvent {
    /// The text after the trigger changed.
    QueryChanged(MentionQuery),
    /// Commit the best match (e.g. Tab).
    ForceComplete,
    /// Commit the menu entry at this index.
    Pick(usize),
    /// The composer closed the menu.
    Close,
}

/// Mention autocomplete session over a room's members.
pub struct MentionSession<P> {
    user_id: String,
    home_server: String,
    room: RoomContext,
    provider: P,
    options: SearchOptions,
    query: MentionQuery,
    result: SearchResult<RoomMember>,
    state: SessionState,
    generation: u64,
}

impl<P: MemberProvider> MentionSession<P> {
    /// Open a session at the trigger position.
    ///
    /// The session starts `Idle` with the unranked member list. If the
    /// initial query already has text it is searched right away.
    pub fn open(
        client: &ClientContext,
        room: RoomContext,
        provider: P,
        options: SearchOptions,
        query: MentionQuery,
    ) -> Self {
        let mut session = Self {
            user_id: client.user_id().to_string(),
            home_server: client.home_server().to_string(),
            room,
            provider,
            options,
            query: MentionQuery {
                text: String::new(),
                range: query.range,
            },
            result: SearchResult {
                query: String::new(),
                items: Vec::new(),
            },
            state: SessionState::Idle,
            generation: 0,
        };
        session.reset_search();
        debug!(room = %session.room.room_id, "mention session opened");

        if !query.text.is_empty() {
            let ticket = session.begin(query);
            session.apply(ticket);
        }
        session
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current query.
    pub fn query(&self) -> &MentionQuery {
        &self.query
    }

    /// Ranked members for the current query.
    pub fn candidates(&self) -> &[RoomMember] {
        &self.result.items
    }

    /// Menu entries for the current query.
    ///
    /// The room entry comes first when the query is the room keyword. An
    /// unresolved entry stands in for the member list when it is empty.
    /// Nothing is listed while the latest search is still pending.
    pub fn items(&self) -> Vec<MentionItem> {
        let mut items = Vec::new();
        if self.state == SessionState::Searching {
            return items;
        }
        if self.query.text == ROOM_MENTION_KEYWORD {
            items.push(MentionItem::Room(self.room.alias_or_id().to_string()));
        }
        if self.result.is_empty() {
            items.push(MentionItem::Unresolved(self.unresolved_id()));
        } else {
            items.extend(self.result.items.iter().cloned().map(MentionItem::Known));
        }
        items
    }

    /// Record a new query and return the ticket for its search.
    ///
    /// Any earlier ticket becomes stale.
    pub fn set_query(&mut self, query: MentionQuery) -> Result<SearchTicket> {
        self.ensure_open()?;
        Ok(self.begin(query))
    }

    /// Run and apply the search for `ticket`.
    ///
    /// Returns `false` without touching the result when a newer query has
    /// been set since the ticket was issued, or when it was already applied.
    pub fn complete_search(&mut self, ticket: SearchTicket) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.apply(ticket))
    }

    /// Set a query and apply its search.
    pub fn update_query(&mut self, query: MentionQuery) -> Result<()> {
        let ticket = self.set_query(query)?;
        self.complete_search(ticket)?;
        Ok(())
    }

    /// Commit the best match for the current query.
    ///
    /// The room keyword wins over any member. Otherwise the top-ranked
    /// member is used, and with no members an identifier is built from the
    /// query text.
    pub fn force_complete(&mut self, editor: &mut dyn MentionEditor) -> Result<MentionSelection> {
        self.ensure_open()?;
        self.settle();

        let item = if self.query.text == ROOM_MENTION_KEYWORD {
            MentionItem::Room(self.room.alias_or_id().to_string())
        } else {
            match self.result.first() {
                Some(member) => MentionItem::Known(member.clone()),
                None => MentionItem::Unresolved(self.unresolved_id()),
            }
        };
        Ok(self.commit(&item, editor))
    }

    /// Commit an entry the user picked.
    pub fn pick(
        &mut self,
        item: &MentionItem,
        editor: &mut dyn MentionEditor,
    ) -> Result<MentionSelection> {
        self.ensure_open()?;
        Ok(self.commit(item, editor))
    }

    /// Close without committing. Closing a finished session does nothing.
    pub fn close(&mut self) {
        if self.state.is_open() {
            debug!(room = %self.room.room_id, "mention session closed");
            self.state = SessionState::Closed;
        }
    }

    /// Deliver one editor event. Returns the selection when the event commits.
    pub fn handle(
        &mut self,
        event: MentionEvent,
        editor: &mut dyn MentionEditor,
    ) -> Result<Option<MentionSelection>> {
        match event {
            MentionEvent::QueryChanged(query) => {
                self.update_query(query)?;
                Ok(None)
            }
            MentionEvent::ForceComplete => self.force_complete(editor).map(Some),
            MentionEvent::Pick(index) => {
                self.ensure_open()?;
                self.settle();
                match self.items().get(index).cloned() {
                    Some(item) => self.pick(&item, editor).map(Some),
                    None => Ok(None),
                }
            }
            MentionEvent::Close => {
                self.close();
                Ok(None)
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state.is_open() {
            Ok(())
        } else {
            Err(ChatlineError::SessionClosed)
        }
    }

    /// Apply the latest query's search if it is still pending.
    fn settle(&mut self) {
        if self.state == SessionState::Searching {
            self.apply(SearchTicket(self.generation));
        }
    }

    fn begin(&mut self, query: MentionQuery) -> SearchTicket {
        self.generation += 1;
        self.query = query;
        self.state = SessionState::Searching;
        SearchTicket(self.generation)
    }

    fn apply(&mut self, ticket: SearchTicket) -> bool {
        if ticket.0 != self.generation || self.state != SessionState::Searching {
            debug!(ticket = ticket.0, current = self.generation, "stale mention search");
            return false;
        }

        if self.query.text.is_empty() {
            self.reset_search();
            self.state = SessionState::Idle;
        } else {
            let members = self.provider.members(&self.room.room_id);
            self.result = search(
                &members,
                member_search_strings,
                &self.query.text,
                &self.options,
            );
            self.state = SessionState::Ready;
        }
        true
    }

    fn reset_search(&mut self) {
        let members = self.provider.members(&self.room.room_id);
        self.result = search(&members, member_search_strings, "", &self.options);
    }

    fn unresolved_id(&self) -> String {
        user_id_from_text(&self.query.text, &self.home_server)
    }

    fn is_self_or_room(&self, id: &str) -> bool {
        id == self.user_id || id == self.room.room_id || id == self.room.alias_or_id()
    }

    fn commit(&mut self, item: &MentionItem, editor: &mut dyn MentionEditor) -> MentionSelection {
        let selection = MentionSelection {
            identifier: item.identifier().to_string(),
            display_label: item.label(),
            is_self_or_room: self.is_self_or_room(item.identifier()),
        };

        let node = MentionNode::new(
            selection.identifier.clone(),
            &selection.display_label,
            selection.is_self_or_room,
        );
        editor.replace_range(&self.query.range, node);
        editor.move_cursor_after();
        self.state = SessionState::Committed;

        info!(
            mention = %selection.identifier,
            label = %selection.display_label,
            "mention committed"
        );
        selection
    }
}
