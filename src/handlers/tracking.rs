//! Room and member tracking.
//!
//! Each handler applies one kind of server line to the [`StateTracker`].
//! The write lock is always released before anything is sent.
//!
//! [`StateTracker`]: crate::state::StateTracker

use async_trait::async_trait;
use slirc_proto::command::verbs;
use slirc_proto::{Line, Privileges};
use tracing::{debug, warn};

use crate::connection::Client;
use crate::dispatch::Handler;

/// JOIN: create the room when we join it, the member when someone new does.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, client: Client, line: Line) {
        let Some(room) = line.arg(0) else {
            return;
        };
        let nick = line.nick();

        let (new_room, new_member) = {
            let mut tracker = client.tracker().write();
            let new_room = !tracker.has_room(room);
            if new_room {
                if !tracker.is_me(nick) {
                    warn!(room = %room, nick = %nick, "JOIN to unknown room");
                    return;
                }
                tracker.new_room(room);
            }
            let new_member = !tracker.has_member(nick);
            if new_member {
                tracker.new_member(nick);
                tracker.nick_info(nick, line.ident(), line.host(), "");
            }
            tracker.associate(room, nick);
            (new_room, new_member)
        };

        if new_room {
            // Ask for the room's modes and who is in it.
            client.mode(room, &[]).await;
            client.who(room).await;
        }
        if new_member {
            client.who(nick).await;
        }
    }
}

pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, client: Client, line: Line) {
        if let Some(room) = line.arg(0) {
            client.tracker().write().dissociate(room, line.nick());
        }
    }
}

pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    async fn handle(&self, client: Client, line: Line) {
        // KICK <room> <nick> [:reason]
        if let (Some(room), Some(nick)) = (line.arg(0), line.arg(1)) {
            client.tracker().write().dissociate(room, nick);
        }
    }
}

pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, client: Client, line: Line) {
        client.tracker().write().delete_member(line.nick());
    }
}

pub struct NickChangeHandler;

#[async_trait]
impl Handler for NickChangeHandler {
    async fn handle(&self, client: Client, line: Line) {
        if let Some(new) = line.arg(0) {
            client.tracker().write().rename_member(line.nick(), new);
        }
    }
}

/// MODE on a room or on ourselves.
pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, client: Client, line: Line) {
        let (Some(target), Some(modes)) = (line.arg(0), line.arg(1)) else {
            return;
        };
        let mut tracker = client.tracker().write();
        if tracker.has_room(target) {
            tracker.apply_room_modes(target, modes, &line.args()[2..]);
        } else if tracker.is_me(target) {
            tracker.apply_user_modes(target, modes);
        } else if tracker.has_member(target) {
            warn!(target = %target, modes = %modes, "MODE for another user");
        } else {
            warn!(target = %target, modes = %modes, "MODE for unknown target");
        }
    }
}

/// TOPIC changes and 332 topic replies.
pub struct TopicHandler;

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, client: Client, line: Line) {
        // TOPIC <room> :<topic>
        // 332 <me> <room> :<topic>
        let (room, topic) = if line.verb() == verbs::TOPIC {
            (line.arg(0), line.arg(1))
        } else {
            (line.arg(1), line.arg(2))
        };
        let Some(room) = room else {
            return;
        };
        let mut tracker = client.tracker().write();
        if tracker.has_room(room) {
            tracker.set_topic(room, topic.unwrap_or(""));
        } else {
            warn!(room = %room, "Topic for unknown room");
        }
    }
}

/// 311: WHOIS user details.
pub struct WhoisUserHandler;

#[async_trait]
impl Handler for WhoisUserHandler {
    async fn handle(&self, client: Client, line: Line) {
        // 311 <me> <nick> <user> <host> * :<realname>
        let (Some(nick), Some(user), Some(host), Some(realname)) =
            (line.arg(1), line.arg(2), line.arg(3), line.arg(5))
        else {
            return;
        };
        let mut tracker = client.tracker().write();
        if tracker.is_me(nick) {
            return;
        }
        if tracker.has_member(nick) {
            tracker.nick_info(nick, user, host, realname);
        } else {
            warn!(nick = %nick, "WHOIS reply for unknown member");
        }
    }
}

/// 324: the room's current modes.
pub struct ChannelModeIsHandler;

#[async_trait]
impl Handler for ChannelModeIsHandler {
    async fn handle(&self, client: Client, line: Line) {
        // 324 <me> <room> <modes> [args...]
        let (Some(room), Some(modes)) = (line.arg(1), line.arg(2)) else {
            return;
        };
        let mut tracker = client.tracker().write();
        if tracker.has_room(room) {
            tracker.apply_room_modes(room, modes, &line.args()[3..]);
        } else {
            warn!(room = %room, "Modes for unknown room");
        }
    }
}

/// 352: one WHO reply row.
pub struct WhoReplyHandler;

#[async_trait]
impl Handler for WhoReplyHandler {
    async fn handle(&self, client: Client, line: Line) {
        // 352 <me> <room> <user> <host> <server> <nick> <flags> :<hops> <realname>
        let (Some(user), Some(host), Some(nick)) = (line.arg(2), line.arg(3), line.arg(5)) else {
            return;
        };
        let mut tracker = client.tracker().write();
        if !tracker.has_member(nick) {
            warn!(nick = %nick, "WHO reply for unknown member");
            return;
        }
        if tracker.is_me(nick) {
            return;
        }
        let realname = line.text().split_once(' ').map_or("", |(_, name)| name);
        tracker.nick_info(nick, user, host, realname);

        if !line.has_args(8) {
            return;
        }
        let flags = line.arg(6).unwrap_or("");
        if flags.contains('*') {
            tracker.apply_user_modes(nick, "+o");
        }
        if flags.contains('B') {
            tracker.apply_user_modes(nick, "+B");
        }
        if flags.contains('H') {
            tracker.apply_user_modes(nick, "+i");
        }
    }
}

/// 353: NAMES reply, adding members and their privileges.
pub struct NamesReplyHandler;

#[async_trait]
impl Handler for NamesReplyHandler {
    async fn handle(&self, client: Client, line: Line) {
        // 353 <me> <kind> <room> :[prefixes]nick ...
        let Some(room) = line.arg(2) else {
            return;
        };
        let mut tracker = client.tracker().write();
        if !tracker.has_room(room) {
            warn!(room = %room, "NAMES reply for unknown room");
            return;
        }

        for entry in line.text().split(' ').filter(|entry| !entry.is_empty()) {
            let nick = entry.trim_start_matches(|c| Privileges::prefix_mode(c).is_some());
            if nick.is_empty() {
                debug!(entry = %entry, "Skipping empty NAMES entry");
                continue;
            }
            if tracker.is_on(room, nick).is_none() {
                if !tracker.has_member(nick) {
                    tracker.new_member(nick);
                }
                tracker.associate(room, nick);
            }
            for prefix in entry[..entry.len() - nick.len()].chars() {
                if let Some(mode) = Privileges::prefix_mode(prefix) {
                    tracker.set_privilege(room, nick, mode, true);
                }
            }
        }
    }
}

/// 671: the member is on a secure connection.
pub struct WhoisSecureHandler;

#[async_trait]
impl Handler for WhoisSecureHandler {
    async fn handle(&self, client: Client, line: Line) {
        // 671 <me> <nick> :is using a secure connection
        let Some(nick) = line.arg(1) else {
            return;
        };
        let mut tracker = client.tracker().write();
        if tracker.has_member(nick) {
            tracker.apply_user_modes(nick, "+z");
        } else {
            warn!(nick = %nick, "Secure-connection reply for unknown member");
        }
    }
}
