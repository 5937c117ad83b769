//! Command catalogue and dispatcher.

use std::future::Future;

use futures::future::{join_all, try_join_all};
use tracing::{debug, info, warn};

use super::args::{parse_ids, parse_users_and_reason, ParsedArguments};
use crate::actions::{ActionError, ActionResult, ClientContext, RoomContext};
use crate::identifier::{is_mxc_uri, is_room_alias, is_room_id, is_user_id};
use crate::{ChatlineError, Result};

/// Slash commands understood by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    /// Send an action message.
    Me,
    /// Send a notice message.
    Notice,
    /// Send a shrug.
    Shrug,
    /// Start a direct message.
    StartDm,
    /// Join rooms.
    Join,
    /// Leave the current room or listed rooms.
    Leave,
    /// Invite users.
    Invite,
    /// Revoke invites.
    DisInvite,
    /// Kick users.
    Kick,
    /// Ban users.
    Ban,
    /// Lift bans.
    UnBan,
    /// Ignore users.
    Ignore,
    /// Stop ignoring users.
    UnIgnore,
    /// Change nick in the current room.
    MyRoomNick,
    /// Change avatar in the current room.
    MyRoomAvatar,
    /// Mark the current room as a direct message.
    ConvertToDm,
    /// Unmark the current direct message.
    ConvertToRoom,
}

impl Command {
    /// Every command, in catalogue order.
    pub const ALL: [Command; 17] = [
        Command::Me,
        Command::Notice,
        Command::Shrug,
        Command::StartDm,
        Command::Join,
        Command::Leave,
        Command::Invite,
        Command::DisInvite,
        Command::Kick,
        Command::Ban,
        Command::UnBan,
        Command::Ignore,
        Command::UnIgnore,
        Command::MyRoomNick,
        Command::MyRoomAvatar,
        Command::ConvertToDm,
        Command::ConvertToRoom,
    ];

    /// Get the command name as typed after the slash.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Me => "me",
            Command::Notice => "notice",
            Command::Shrug => "shrug",
            Command::StartDm => "startdm",
            Command::Join => "join",
            Command::Leave => "leave",
            Command::Invite => "invite",
            Command::DisInvite => "disinvite",
            Command::Kick => "kick",
            Command::Ban => "ban",
            Command::UnBan => "unban",
            Command::Ignore => "ignore",
            Command::UnIgnore => "unignore",
            Command::MyRoomNick => "myroomnick",
            Command::MyRoomAvatar => "myroomavatar",
            Command::ConvertToDm => "converttodm",
            Command::ConvertToRoom => "converttoroom",
        }
    }

    /// Look up a command by exact, case-sensitive name.
    pub fn from_name(name: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Human-readable description, with an example where useful.
    pub fn description(&self) -> &'static str {
        match self {
            Command::Me => "Send action message",
            Command::Notice => "Send notice message",
            Command::Shrug => "Send ¯\\_(ツ)_/¯ as message",
            Command::StartDm => "Start direct message with user. Example: /startdm userId1",
            Command::Join => "Join room with address. Example: /join address1 address2",
            Command::Leave => "Leave current room.",
            Command::Invite => {
                "Invite user to room. Example: /invite userId1 userId2 [-r reason]"
            }
            Command::DisInvite => {
                "Disinvite user to room. Example: /disinvite userId1 userId2 [-r reason]"
            }
            Command::Kick => "Kick user from room. Example: /kick userId1 userId2 [-r reason]",
            Command::Ban => "Ban user from room. Example: /ban userId1 userId2 [-r reason]",
            Command::UnBan => "Unban user from room. Example: /unban userId1 userId2",
            Command::Ignore => "Ignore user. Example: /ignore userId1 userId2",
            Command::UnIgnore => "Unignore user. Example: /unignore userId1 userId2",
            Command::MyRoomNick => "Change nick in current room.",
            Command::MyRoomAvatar => {
                "Change profile picture in current room. Example /myroomavatar mxc://xyzabc"
            }
            Command::ConvertToDm => "Convert room to direct message",
            Command::ConvertToRoom => "Convert direct message to room",
        }
    }

    /// Whether the command only marks how the payload is sent as a message.
    pub fn is_message_style(&self) -> bool {
        matches!(self, Command::Me | Command::Notice | Command::Shrug)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// Catalogue entry for help and autocomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContent {
    /// The command.
    pub command: Command,
    /// Name typed after the slash.
    pub name: &'static str,
    /// Description shown to the user.
    pub description: &'static str,
}

/// Commands bound to one client and one room.
///
/// Immutable once built; build a new registry when either context changes.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    client: ClientContext,
    room: RoomContext,
    commands: Vec<CommandContent>,
}

impl CommandRegistry {
    /// Build the registry for a client and room.
    pub fn new(client: ClientContext, room: RoomContext) -> Self {
        let commands = Command::ALL
            .iter()
            .map(|&command| CommandContent {
                command,
                name: command.name(),
                description: command.description(),
            })
            .collect();
        debug!(user = client.user_id(), room = %room.room_id, "command registry built");
        Self {
            client,
            room,
            commands,
        }
    }

    /// Whether this registry was built for a different client or room.
    pub fn needs_rebuild(&self, client: &ClientContext, room: &RoomContext) -> bool {
        !self.client.same_identity(client) || self.room != *room
    }

    /// All commands, in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandContent> {
        self.commands.iter()
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<&CommandContent> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Resolve a typed command name and run it.
    ///
    /// Returns [`ChatlineError::UnknownCommand`] when the name is not in
    /// the catalogue, leaving the fallback to the caller.
    pub async fn dispatch(&self, name: &str, payload: &str) -> Result<()> {
        let command = self
            .get(name)
            .map(|c| c.command)
            .ok_or_else(|| ChatlineError::UnknownCommand(name.to_string()))?;
        self.execute(command, payload).await
    }

    /// Run a command with the raw text that followed its name.
    pub async fn execute(&self, command: Command, payload: &str) -> Result<()> {
        info!(command = %command, room = %self.room.room_id, "executing command");
        let actions = self.client.actions();
        let room_id = self.room.room_id.as_str();

        match command {
            Command::Me | Command::Notice | Command::Shrug => Ok(()),
            Command::StartDm => self.start_dm(payload).await,
            Command::Join => {
                let rooms = parse_ids(payload, |id| is_room_id(id) || is_room_alias(id));
                each_target(&rooms, |id| actions.join_room(id)).await
            }
            Command::Leave => {
                if payload.trim().is_empty() {
                    actions.leave_room(room_id).await?;
                    return Ok(());
                }
                let rooms = parse_ids(payload, is_room_id);
                each_target(&rooms, |id| actions.leave_room(id)).await
            }
            Command::Invite => {
                let ParsedArguments { users, reason } = parse_users_and_reason(payload);
                let reason = reason.as_deref();
                each_target(&users, |id| actions.invite(room_id, id, reason)).await
            }
            Command::DisInvite | Command::Kick => {
                let ParsedArguments { users, reason } = parse_users_and_reason(payload);
                let reason = reason.as_deref();
                each_target(&users, |id| actions.kick(room_id, id, reason)).await
            }
            Command::Ban => {
                let ParsedArguments { users, reason } = parse_users_and_reason(payload);
                let reason = reason.as_deref();
                each_target(&users, |id| actions.ban(room_id, id, reason)).await
            }
            Command::UnBan => {
                let users = parse_ids(payload, is_user_id);
                each_target(&users, |id| actions.unban(room_id, id)).await
            }
            Command::Ignore => {
                let users = parse_ids(payload, is_user_id);
                if !users.is_empty() {
                    actions.ignore(&users).await?;
                }
                Ok(())
            }
            Command::UnIgnore => {
                let users = parse_ids(payload, is_user_id);
                if !users.is_empty() {
                    actions.unignore(&users).await?;
                }
                Ok(())
            }
            Command::MyRoomNick => {
                let nick = payload.trim();
                if nick.is_empty() {
                    debug!("empty nick ignored");
                    return Ok(());
                }
                actions.set_room_nick(room_id, nick).await?;
                Ok(())
            }
            Command::MyRoomAvatar => {
                if !is_mxc_uri(payload) {
                    debug!(payload, "not a content URI, avatar unchanged");
                    return Ok(());
                }
                actions.set_room_avatar(room_id, payload).await?;
                Ok(())
            }
            Command::ConvertToDm => {
                actions.convert_to_dm(room_id).await?;
                Ok(())
            }
            Command::ConvertToRoom => {
                actions.convert_to_room(room_id).await?;
                Ok(())
            }
        }
    }

    async fn start_dm(&self, payload: &str) -> Result<()> {
        let actions = self.client.actions();
        let me = self.client.user_id();
        let users = parse_ids(payload, |id| is_user_id(id) && id != me);
        if users.is_empty() {
            return Ok(());
        }

        if let [user] = users.as_slice() {
            if let Some(room_id) = actions.direct_room_with(user) {
                debug!(user = %user, room = %room_id, "direct message exists");
                actions.select_room(&room_id).await?;
                return Ok(());
            }
        }

        let devices = self.client.devices();
        let capable = try_join_all(users.iter().map(|id| devices.has_devices(id)))
            .await
            .map_err(ChatlineError::DeviceLookup)?;
        let encrypted = capable.iter().all(|has_devices| *has_devices);

        let room_id = actions.create_dm(&users, encrypted).await?;
        actions.select_room(&room_id).await?;
        Ok(())
    }
}

/// Issue one call per target and wait for all of them.
///
/// Calls are independent: a failure does not stop or undo the others.
async fn each_target<'a, F, Fut>(targets: &'a [String], call: F) -> Result<()>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = ActionResult<()>>,
{
    let attempted = targets.len();
    let results = join_all(targets.iter().map(|target| call(target.as_str()))).await;
    let mut failures: Vec<ActionError> = results.into_iter().filter_map(|r| r.err()).collect();

    for failure in &failures {
        warn!(error = %failure, "action failed");
    }

    match failures.len() {
        0 => Ok(()),
        1 if attempted == 1 => Err(ChatlineError::Action(failures.remove(0))),
        _ => Err(ChatlineError::PartialFailure {
            attempted,
            failures,
        }),
    }
}
