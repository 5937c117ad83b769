//! Room members as seen by the mention engine.

use serde::Deserialize;

use crate::identifier::local_part;

/// A room member. Owned by the membership provider; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomMember {
    /// User identifier.
    pub user_id: String,
    /// Raw display name from the member event, if set.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl RoomMember {
    /// Create a member without a display name.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
        }
    }

    /// Set the raw display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name set in the room, ignoring names that just repeat the ID.
    pub fn room_display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty() && *name != self.user_id)
    }

    /// Resolve the label shown for this member using the default policy.
    pub fn name(&self) -> String {
        resolve_display_name(self, DEFAULT_DISPLAY_NAME_POLICY)
    }
}

/// Local part of an identifier, or the identifier itself if it has none.
pub fn mx_id_to_name(id: &str) -> &str {
    local_part(id).unwrap_or(id)
}

/// One step of display-name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayNameStrategy {
    /// The member's display name in the room.
    RoomDisplayName,
    /// Local part of the user identifier.
    LocalPart,
    /// The user identifier unchanged.
    RawIdentifier,
}

impl DisplayNameStrategy {
    /// Try this strategy; `None` means fall through to the next one.
    pub fn resolve<'a>(&self, member: &'a RoomMember) -> Option<&'a str> {
        let name = match self {
            DisplayNameStrategy::RoomDisplayName => member.room_display_name(),
            DisplayNameStrategy::LocalPart => local_part(&member.user_id),
            DisplayNameStrategy::RawIdentifier => Some(member.user_id.as_str()),
        };
        name.filter(|n| !n.is_empty())
    }
}

/// Order in which display-name strategies are tried.
pub const DEFAULT_DISPLAY_NAME_POLICY: &[DisplayNameStrategy] = &[
    DisplayNameStrategy::RoomDisplayName,
    DisplayNameStrategy::LocalPart,
    DisplayNameStrategy::RawIdentifier,
];

/// Resolve a member's label: the first strategy with a non-empty result wins.
pub fn resolve_display_name(member: &RoomMember, policy: &[DisplayNameStrategy]) -> String {
    policy
        .iter()
        .find_map(|strategy| strategy.resolve(member))
        .unwrap_or(member.user_id.as_str())
        .to_string()
}

/// Strings a member is matched against for a given query.
///
/// The first is the display name (the local part when the raw name just
/// repeats the ID). The second is the full user ID when the query looks like
/// one (contains `@` or `:`), otherwise the local part.
pub fn member_search_strings(member: &RoomMember, query: &str) -> Vec<String> {
    let name = match member.display_name.as_deref() {
        Some(name) if name != member.user_id => name,
        _ => mx_id_to_name(&member.user_id),
    };
    let id = if query.starts_with('@') || query.contains(':') {
        member.user_id.as_str()
    } else {
        mx_id_to_name(&member.user_id)
    };
    vec![name.to_string(), id.to_string()]
}
