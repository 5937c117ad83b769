//! Test helpers for integration tests.
//!
//! Provides recording collaborators that capture every call made by the
//! command registry and mention sessions.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use chatline::{
    ActionError, ActionResult, ClientContext, DeviceLookup, MentionEditor, MentionNode,
    RoomActions, RoomContext, TextRange,
};

/// Acting user in tests.
pub const ME: &str = "@me:x";

/// Current room in tests.
pub const ROOM_ID: &str = "!room:x";

/// Canonical alias of the current room.
pub const ROOM_ALIAS: &str = "#room:x";

/// A call made on the recording collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Join(String),
    Leave(String),
    Invite {
        room: String,
        user: String,
        reason: Option<String>,
    },
    Kick {
        room: String,
        user: String,
        reason: Option<String>,
    },
    Ban {
        room: String,
        user: String,
        reason: Option<String>,
    },
    Unban {
        room: String,
        user: String,
    },
    Ignore(Vec<String>),
    Unignore(Vec<String>),
    SetRoomNick {
        room: String,
        nick: String,
    },
    SetRoomAvatar {
        room: String,
        uri: String,
    },
    ConvertToDm(String),
    ConvertToRoom(String),
    CreateDm {
        users: Vec<String>,
        encrypted: bool,
    },
    SelectRoom(String),
    OpenInviteDialog(String),
    HasDevices(String),
}

/// Collaborator that records every call and fails on request.
#[derive(Default)]
pub struct RecordingActions {
    calls: Mutex<Vec<Call>>,
    failing_targets: HashSet<String>,
    direct_rooms: HashMap<String, String>,
    no_devices: HashSet<String>,
    failing_lookups: HashSet<String>,
}

impl RecordingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every action targeting `target` fail.
    pub fn fail_for(mut self, target: &str) -> Self {
        self.failing_targets.insert(target.to_string());
        self
    }

    /// Register an existing direct message room with `user`.
    pub fn with_direct_room(mut self, user: &str, room: &str) -> Self {
        self.direct_rooms.insert(user.to_string(), room.to_string());
        self
    }

    /// Report `user` as having no devices.
    pub fn without_devices(mut self, user: &str) -> Self {
        self.no_devices.insert(user.to_string());
        self
    }

    /// Make the device lookup for `user` fail.
    pub fn lookup_fails_for(mut self, user: &str) -> Self {
        self.failing_lookups.insert(user.to_string());
        self
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls recorded so far, without device lookups.
    pub fn actions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::HasDevices(_)))
            .collect()
    }

    fn record(&self, call: Call, action: &str, target: &str) -> ActionResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing_targets.contains(target) {
            Err(ActionError::new(action, target, "rejected by server"))
        } else {
            Ok(())
        }
    }
}

fn owned(reason: Option<&str>) -> Option<String> {
    reason.map(str::to_string)
}

#[async_trait]
impl RoomActions for RecordingActions {
    async fn join_room(&self, room_id_or_alias: &str) -> ActionResult<()> {
        self.record(
            Call::Join(room_id_or_alias.to_string()),
            "join",
            room_id_or_alias,
        )
    }

    async fn leave_room(&self, room_id: &str) -> ActionResult<()> {
        self.record(Call::Leave(room_id.to_string()), "leave", room_id)
    }

    async fn invite(
        &self,
        room_id: &str,
        user_id: &str,
        reason: Option<&str>,
    ) -> ActionResult<()> {
        let call = Call::Invite {
            room: room_id.to_string(),
            user: user_id.to_string(),
            reason: owned(reason),
        };
        self.record(call, "invite", user_id)
    }

    async fn kick(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> ActionResult<()> {
        let call = Call::Kick {
            room: room_id.to_string(),
            user: user_id.to_string(),
            reason: owned(reason),
        };
        self.record(call, "kick", user_id)
    }

    async fn ban(&self, room_id: &str, user_id: &str, reason: Option<&str>) -> ActionResult<()> {
        let call = Call::Ban {
            room: room_id.to_string(),
            user: user_id.to_string(),
            reason: owned(reason),
        };
        self.record(call, "ban", user_id)
    }

    async fn unban(&self, room_id: &str, user_id: &str) -> ActionResult<()> {
        let call = Call::Unban {
            room: room_id.to_string(),
            user: user_id.to_string(),
        };
        self.record(call, "unban", user_id)
    }

    async fn ignore(&self, user_ids: &[String]) -> ActionResult<()> {
        self.record(Call::Ignore(user_ids.to_vec()), "ignore", "")
    }

    async fn unignore(&self, user_ids: &[String]) -> ActionResult<()> {
        self.record(Call::Unignore(user_ids.to_vec()), "unignore", "")
    }

    async fn set_room_nick(&self, room_id: &str, nick: &str) -> ActionResult<()> {
        let call = Call::SetRoomNick {
            room: room_id.to_string(),
            nick: nick.to_string(),
        };
        self.record(call, "set_room_nick", room_id)
    }

    async fn set_room_avatar(&self, room_id: &str, mxc_uri: &str) -> ActionResult<()> {
        let call = Call::SetRoomAvatar {
            room: room_id.to_string(),
            uri: mxc_uri.to_string(),
        };
        self.record(call, "set_room_avatar", room_id)
    }

    async fn convert_to_dm(&self, room_id: &str) -> ActionResult<()> {
        self.record(Call::ConvertToDm(room_id.to_string()), "convert_to_dm", room_id)
    }

    async fn convert_to_room(&self, room_id: &str) -> ActionResult<()> {
        self.record(
            Call::ConvertToRoom(room_id.to_string()),
            "convert_to_room",
            room_id,
        )
    }

    async fn create_dm(&self, user_ids: &[String], encrypted: bool) -> ActionResult<String> {
        let call = Call::CreateDm {
            users: user_ids.to_vec(),
            encrypted,
        };
        self.record(call, "create_dm", "")?;
        Ok("!new-dm:x".to_string())
    }

    async fn select_room(&self, room_id: &str) -> ActionResult<()> {
        self.record(Call::SelectRoom(room_id.to_string()), "select_room", room_id)
    }

    async fn open_invite_dialog(&self, room_id: &str) -> ActionResult<()> {
        self.record(
            Call::OpenInviteDialog(room_id.to_string()),
            "open_invite_dialog",
            room_id,
        )
    }

    fn direct_room_with(&self, user_id: &str) -> Option<String> {
        self.direct_rooms.get(user_id).cloned()
    }
}

#[async_trait]
impl DeviceLookup for RecordingActions {
    async fn has_devices(&self, user_id: &str) -> ActionResult<bool> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::HasDevices(user_id.to_string()));
        if self.failing_lookups.contains(user_id) {
            return Err(ActionError::new("has_devices", user_id, "lookup timed out"));
        }
        Ok(!self.no_devices.contains(user_id))
    }
}

/// Client context acting as [`ME`] through `actions`.
pub fn client(actions: &Arc<RecordingActions>) -> ClientContext {
    ClientContext::new(ME, actions.clone(), actions.clone())
}

/// The current room, with its alias.
pub fn room() -> RoomContext {
    RoomContext::new(ROOM_ID).with_alias(ROOM_ALIAS)
}

/// Editor that records inserted mentions.
#[derive(Default)]
pub struct RecordingEditor {
    pub inserted: Vec<(TextRange, MentionNode)>,
    pub cursor_moves: usize,
}

impl MentionEditor for RecordingEditor {
    fn replace_range(&mut self, range: &TextRange, node: MentionNode) {
        self.inserted.push((*range, node));
    }

    fn move_cursor_after(&mut self) {
        self.cursor_moves += 1;
    }
}
