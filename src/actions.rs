//! External collaborators consumed by the command and mention cores.
//!
//! The chat protocol itself lives behind these traits. Nothing in this
//! crate retries a failed call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::identifier::server_name;
use crate::mention::RoomMember;

/// Failure reported by an external collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{action} {target}: {message}")]
pub struct ActionError {
    /// Name of the action that failed (e.g. "ban").
    pub action: String,
    /// Room or user the action targeted.
    pub target: String,
    /// Error text from the collaborator.
    pub message: String,
}

impl ActionError {
    /// Create a new action error.
    pub fn new(
        action: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Result of an external collaborator call.
pub type ActionResult<T> = std::result::Result<T, ActionError>;

/// Action-dispatch surface: one method per domain action.
#[async_trait]
pub trait RoomActions: Send + Sync {
    /// Join a room by ID or alias.
    async fn join_room(&self, room_id_or_alias: &str) -> ActionResult<()>;

    /// Leave a room.
    async fn leave_room(&self, room_id: &str) -> ActionResult<()>;

    /// Invite a user to a room.
    async fn invite(&self, room_id: &str, user_id: &str, reason: Option<&str>)
        -> ActionResult<()>;

    /// Kick a user from a room (also used to revoke an invite).
    async fn kick(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> ActionResult<()>;

    /// Ban a user from a room.
    async fn ban(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> ActionResult<()>;

    /// Lift a ban.
    async fn unban(&self, room_id: &str, user_id: &str) -> ActionResult<()>;

    /// Add users to the ignore list.
    async fn ignore(&self, user_ids: &[String]) -> ActionResult<()>;

    /// Remove users from the ignore list.
    async fn unignore(&self, user_ids: &[String]) -> ActionResult<()>;

    /// Set the acting user's display name in one room.
    async fn set_room_nick(&self, room_id: &str, nick: &str) -> ActionResult<()>;

    /// Set the acting user's avatar in one room.
    async fn set_room_avatar(&self, room_id: &str, mxc_uri: &str) -> ActionResult<()>;

    /// Mark a room as a direct message.
    async fn convert_to_dm(&self, room_id: &str) -> ActionResult<()>;

    /// Unmark a direct message so it becomes a regular room.
    async fn convert_to_room(&self, room_id: &str) -> ActionResult<()>;

    /// Create a direct message room and return its ID.
    async fn create_dm(&self, user_ids: &[String], encrypted: bool) -> ActionResult<String>;

    /// Make a room the active one in the client.
    async fn select_room(&self, room_id: &str) -> ActionResult<()>;

    /// Show the invite dialog for a room.
    async fn open_invite_dialog(&self, room_id: &str) -> ActionResult<()>;

    /// Existing direct message room with a user, if any.
    fn direct_room_with(&self, user_id: &str) -> Option<String>;
}

/// Device-capability lookup used to decide encryption for new direct messages.
#[async_trait]
pub trait DeviceLookup: Send + Sync {
    /// Whether the user has any known cryptographic devices.
    async fn has_devices(&self, user_id: &str) -> ActionResult<bool>;
}

/// Room-membership provider.
pub trait MemberProvider {
    /// Snapshot of the current members of a room.
    fn members(&self, room_id: &str) -> Vec<RoomMember>;
}

impl MemberProvider for Vec<RoomMember> {
    fn members(&self, _room_id: &str) -> Vec<RoomMember> {
        self.clone()
    }
}

/// The acting user and the collaborators that act on their behalf.
#[derive(Clone)]
pub struct ClientContext {
    user_id: String,
    actions: Arc<dyn RoomActions>,
    devices: Arc<dyn DeviceLookup>,
}

impl ClientContext {
    /// Create a new client context.
    pub fn new(
        user_id: impl Into<String>,
        actions: Arc<dyn RoomActions>,
        devices: Arc<dyn DeviceLookup>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            actions,
            devices,
        }
    }

    /// The acting user's identifier.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Server part of the acting user's identifier, or empty if malformed.
    pub fn home_server(&self) -> &str {
        server_name(&self.user_id).unwrap_or_default()
    }

    /// Action-dispatch surface.
    pub fn actions(&self) -> &dyn RoomActions {
        self.actions.as_ref()
    }

    /// Device-capability lookup.
    pub fn devices(&self) -> &dyn DeviceLookup {
        self.devices.as_ref()
    }

    /// Whether two contexts act for the same user through the same collaborators.
    pub fn same_identity(&self, other: &ClientContext) -> bool {
        self.user_id == other.user_id
            && Arc::ptr_eq(&self.actions, &other.actions)
            && Arc::ptr_eq(&self.devices, &other.devices)
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// The room the composer is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomContext {
    /// Room identifier.
    pub room_id: String,
    /// Canonical alias, if the room has one.
    pub canonical_alias: Option<String>,
}

impl RoomContext {
    /// Create a room context without an alias.
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            canonical_alias: None,
        }
    }

    /// Set the canonical alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.canonical_alias = Some(alias.into());
        self
    }

    /// Canonical alias, falling back to the room ID.
    pub fn alias_or_id(&self) -> &str {
        match self.canonical_alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.room_id,
        }
    }
}

/// Action surface that only logs what it would do.
///
/// Used by the dry-run binary. Every call succeeds; `create_dm` hands out
/// sequential placeholder room IDs on the acting user's server.
#[derive(Debug)]
pub struct TracingActions {
    server: String,
    next_room: AtomicU64,
}

impl TracingActions {
    /// Create a dry-run surface that allocates rooms on `server`.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            next_room: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl RoomActions for TracingActions {
    async fn join_room(&self, room_id_or_alias: &str) -> ActionResult<()> {
        info!(room = room_id_or_alias, "join");
        Ok(())
    }

    async fn leave_room(&self, room_id: &str) -> ActionResult<()> {
        info!(room = room_id, "leave");
        Ok(())
    }

    async fn invite(
        &self,
        room_id: &str,
        user_id: &str,
        reason: Option<&str>,
    ) -> ActionResult<()> {
        info!(room = room_id, user = user_id, ?reason, "invite");
        Ok(())
    }

    async fn kick(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> ActionResult<()> {
        info!(room = room_id, user = user_id, ?reason, "kick");
        Ok(())
    }

    async fn ban(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> ActionResult<()> {
        info!(room = room_id, user = user_id, ?reason, "ban");
        Ok(())
    }

    async fn unban(&self, room_id: &str, user_id: &str) -> ActionResult<()> {
        info!(room = room_id, user = user_id, "unban");
        Ok(())
    }

    async fn ignore(&self, user_ids: &[String]) -> ActionResult<()> {
        info!(users = ?user_ids, "ignore");
        Ok(())
    }

    async fn unignore(&self, user_ids: &[String]) -> ActionResult<()> {
        info!(users = ?user_ids, "unignore");
        Ok(())
    }

    async fn set_room_nick(&self, room_id: &str, nick: &str) -> ActionResult<()> {
        info!(room = room_id, nick, "set room nick");
        Ok(())
    }

    async fn set_room_avatar(&self, room_id: &str, mxc_uri: &str) -> ActionResult<()> {
        info!(room = room_id, avatar = mxc_uri, "set room avatar");
        Ok(())
    }

    async fn convert_to_dm(&self, room_id: &str) -> ActionResult<()> {
        info!(room = room_id, "convert to direct message");
        Ok(())
    }

    async fn convert_to_room(&self, room_id: &str) -> ActionResult<()> {
        info!(room = room_id, "convert to room");
        Ok(())
    }

    async fn create_dm(&self, user_ids: &[String], encrypted: bool) -> ActionResult<String> {
        let n = self.next_room.fetch_add(1, Ordering::Relaxed);
        let room_id = format!("!dm{n}:{}", self.server);
        info!(users = ?user_ids, encrypted, room = %room_id, "create direct message");
        Ok(room_id)
    }

    async fn select_room(&self, room_id: &str) -> ActionResult<()> {
        info!(room = room_id, "select room");
        Ok(())
    }

    async fn open_invite_dialog(&self, room_id: &str) -> ActionResult<()> {
        info!(room = room_id, "open invite dialog");
        Ok(())
    }

    fn direct_room_with(&self, _user_id: &str) -> Option<String> {
        None
    }
}

#[async_trait]
impl DeviceLookup for TracingActions {
    async fn has_devices(&self, _user_id: &str) -> ActionResult<bool> {
        Ok(true)
    }
}
