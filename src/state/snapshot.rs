//! Owned copies of tracker state handed to callers.

use std::collections::BTreeMap;

use slirc_proto::{ChannelModes, Privileges, UserModes};

/// A room as the tracker last saw it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub topic: String,
    pub modes: ChannelModes,
    /// Host-form ban masks, each with the current members it matches.
    pub bans: BTreeMap<String, Vec<String>>,
    /// Members by nick, with their privileges here.
    pub members: BTreeMap<String, Privileges>,
}

impl Room {
    /// Returns true if `nick` is in the room.
    pub fn has_member(&self, nick: &str) -> bool {
        self.members.contains_key(nick)
    }

    /// Ban masks that currently match `nick`.
    pub fn bans_matching(&self, nick: &str) -> Vec<&str> {
        self.bans
            .iter()
            .filter(|(_, nicks)| nicks.iter().any(|n| n == nick))
            .map(|(mask, _)| mask.as_str())
            .collect()
    }
}

/// A member, or the local identity, as the tracker last saw it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Member {
    pub nick: String,
    pub user: String,
    pub host: String,
    pub realname: String,
    pub modes: UserModes,
    /// Shared rooms by name, with this member's privileges in each.
    pub rooms: BTreeMap<String, Privileges>,
}

impl Member {
    /// `nick!user@host`, the form ban masks match against.
    pub fn hostmask(&self) -> String {
        format!("{}!{}@{}", self.nick, self.user, self.host)
    }

    /// Returns true if the member shares `room` with us.
    pub fn is_on(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }
}
