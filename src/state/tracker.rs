//! The per-connection model of rooms and members.
//!
//! The tracker holds plain records; the client wraps it in a
//! `parking_lot::RwLock` so built-in handlers mutate under the write lock
//! and callers take snapshots under the read lock. Each (room, member) link
//! has exactly one privilege record, stored in the room's member map; a
//! member only keeps the names of the rooms it is in. Both sides of a link
//! change in the same method, so they cannot drift apart.
//!
//! The server is trusted but not believed: operations on unknown rooms or
//! members log a warning and do nothing.

use std::collections::{BTreeSet, HashMap};

use slirc_proto::mode::{parse_channel_modes, parse_user_modes};
use slirc_proto::util::{ban_mask_host, wildcard_match};
use slirc_proto::{ChannelModes, ModeChange, ModeFlags, Privileges, UserModes};
use tracing::{debug, warn};

use super::snapshot::{Member, Room};

#[derive(Debug, Default)]
struct RoomRecord {
    name: String,
    topic: String,
    modes: ChannelModes,
    bans: BTreeSet<String>,
    members: HashMap<String, Privileges>,
}

#[derive(Debug, Default)]
struct MemberRecord {
    nick: String,
    user: String,
    host: String,
    realname: String,
    modes: UserModes,
    rooms: BTreeSet<String>,
}

impl MemberRecord {
    fn hostmask(&self) -> String {
        format!("{}!{}@{}", self.nick, self.user, self.host)
    }
}

/// Rooms, members and the local identity seen on one connection.
#[derive(Debug)]
pub struct StateTracker {
    /// Key of the local identity in `members`.
    me: String,
    members: HashMap<String, MemberRecord>,
    rooms: HashMap<String, RoomRecord>,
}

impl StateTracker {
    /// A tracker holding only the local identity.
    pub fn new(nick: &str, user: &str, realname: &str) -> Self {
        let me = MemberRecord {
            nick: nick.to_owned(),
            user: user.to_owned(),
            realname: realname.to_owned(),
            ..Default::default()
        };
        let mut members = HashMap::new();
        members.insert(nick.to_owned(), me);
        Self {
            me: nick.to_owned(),
            members,
            rooms: HashMap::new(),
        }
    }

    /// The local identity's current nick.
    pub fn my_nick(&self) -> &str {
        &self.me
    }

    /// Returns true if `nick` is the local identity.
    pub fn is_me(&self, nick: &str) -> bool {
        self.me == nick
    }

    /// Snapshot of the local identity.
    pub fn me(&self) -> Member {
        // The local identity is never removed from `members`.
        self.get_member(&self.me).unwrap_or_default()
    }

    /// Record the host the server reported for us.
    pub fn set_my_host(&mut self, host: &str) {
        if let Some(me) = self.members.get_mut(&self.me) {
            me.host = host.to_owned();
        }
    }

    /// Drop every room and member, keeping only the local identity's
    /// nick, user, host and realname.
    pub fn wipe(&mut self) {
        let me = self.members.remove(&self.me).unwrap_or_default();
        self.rooms.clear();
        self.members.clear();
        self.members.insert(
            self.me.clone(),
            MemberRecord {
                nick: me.nick,
                user: me.user,
                host: me.host,
                realname: me.realname,
                ..Default::default()
            },
        );
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Start tracking `nick`. Idempotent.
    pub fn new_member(&mut self, nick: &str) -> Member {
        if self.members.contains_key(nick) {
            warn!(nick = %nick, "Tracker: member already tracked");
        } else {
            self.members.insert(
                nick.to_owned(),
                MemberRecord {
                    nick: nick.to_owned(),
                    ..Default::default()
                },
            );
        }
        self.get_member(nick).unwrap_or_default()
    }

    /// Snapshot of a tracked member.
    pub fn get_member(&self, nick: &str) -> Option<Member> {
        let rec = self.members.get(nick)?;
        let rooms = rec
            .rooms
            .iter()
            .filter_map(|name| {
                let privs = self.rooms.get(name)?.members.get(nick)?;
                Some((name.clone(), *privs))
            })
            .collect();
        Some(Member {
            nick: rec.nick.clone(),
            user: rec.user.clone(),
            host: rec.host.clone(),
            realname: rec.realname.clone(),
            modes: rec.modes.clone(),
            rooms,
        })
    }

    /// Returns true if `nick` is tracked.
    pub fn has_member(&self, nick: &str) -> bool {
        self.members.contains_key(nick)
    }

    /// Snapshots of every tracked member, the local identity included.
    pub fn members(&self) -> Vec<Member> {
        let mut nicks: Vec<&String> = self.members.keys().collect();
        nicks.sort();
        nicks.into_iter().filter_map(|n| self.get_member(n)).collect()
    }

    /// Rename a member everywhere it appears.
    pub fn rename_member(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }
        if self.members.contains_key(new) {
            warn!(old = %old, new = %new, "Tracker: rename target already tracked");
            return;
        }
        let Some(mut rec) = self.members.remove(old) else {
            warn!(old = %old, new = %new, "Tracker: rename of unknown member");
            return;
        };
        rec.nick = new.to_owned();
        for name in &rec.rooms {
            if let Some(room) = self.rooms.get_mut(name)
                && let Some(privs) = room.members.remove(old)
            {
                room.members.insert(new.to_owned(), privs);
            }
        }
        self.members.insert(new.to_owned(), rec);
        if self.me == old {
            self.me = new.to_owned();
        }
    }

    /// Stop tracking `nick` and remove it from every room. The local
    /// identity cannot be deleted.
    pub fn delete_member(&mut self, nick: &str) {
        if self.is_me(nick) {
            warn!(nick = %nick, "Tracker: refusing to delete the local identity");
            return;
        }
        let Some(rec) = self.members.remove(nick) else {
            warn!(nick = %nick, "Tracker: delete of unknown member");
            return;
        };
        for name in &rec.rooms {
            if let Some(room) = self.rooms.get_mut(name) {
                room.members.remove(nick);
            }
        }
    }

    /// Fill in a member's identity fields.
    pub fn nick_info(&mut self, nick: &str, user: &str, host: &str, realname: &str) {
        match self.members.get_mut(nick) {
            Some(rec) => {
                rec.user = user.to_owned();
                rec.host = host.to_owned();
                rec.realname = realname.to_owned();
            }
            None => warn!(nick = %nick, "Tracker: nick info for unknown member"),
        }
    }

    /// Apply a user mode string such as `+iw-x`.
    pub fn apply_user_modes(&mut self, nick: &str, modes: &str) {
        let Some(rec) = self.members.get_mut(nick) else {
            warn!(nick = %nick, "Tracker: user modes for unknown member");
            return;
        };
        for change in parse_user_modes(modes) {
            if let ModeChange::Flag { mode, set } = change
                && !rec.modes.set_flag(mode, set)
            {
                warn!(nick = %nick, mode = %mode, "Tracker: unknown user mode");
            }
        }
    }

    // ========================================================================
    // Rooms
    // ========================================================================

    /// Start tracking `name`. Idempotent.
    pub fn new_room(&mut self, name: &str) -> Room {
        if self.rooms.contains_key(name) {
            warn!(room = %name, "Tracker: room already tracked");
        } else {
            self.rooms.insert(
                name.to_owned(),
                RoomRecord {
                    name: name.to_owned(),
                    ..Default::default()
                },
            );
        }
        self.get_room(name).unwrap_or_default()
    }

    /// Snapshot of a tracked room.
    pub fn get_room(&self, name: &str) -> Option<Room> {
        let rec = self.rooms.get(name)?;
        let bans = rec
            .bans
            .iter()
            .map(|mask| {
                let mut tagged: Vec<String> = rec
                    .members
                    .keys()
                    .filter(|nick| {
                        self.members
                            .get(*nick)
                            .is_some_and(|m| wildcard_match(mask, &m.hostmask()))
                    })
                    .cloned()
                    .collect();
                tagged.sort();
                (mask.clone(), tagged)
            })
            .collect();
        Some(Room {
            name: rec.name.clone(),
            topic: rec.topic.clone(),
            modes: rec.modes.clone(),
            bans,
            members: rec.members.iter().map(|(n, p)| (n.clone(), *p)).collect(),
        })
    }

    /// Returns true if `name` is tracked.
    pub fn has_room(&self, name: &str) -> bool {
        self.rooms.contains_key(name)
    }

    /// Snapshots of every tracked room.
    pub fn rooms(&self) -> Vec<Room> {
        let mut names: Vec<&String> = self.rooms.keys().collect();
        names.sort();
        names.into_iter().filter_map(|n| self.get_room(n)).collect()
    }

    /// Set a room's topic.
    pub fn set_topic(&mut self, room: &str, topic: &str) {
        match self.rooms.get_mut(room) {
            Some(rec) => rec.topic = topic.to_owned(),
            None => warn!(room = %room, "Tracker: topic for unknown room"),
        }
    }

    /// Link a member to a room with no privileges. Both must be tracked.
    pub fn associate(&mut self, room: &str, nick: &str) -> Option<Privileges> {
        let (Some(r), Some(m)) = (self.rooms.get_mut(room), self.members.get_mut(nick)) else {
            warn!(room = %room, nick = %nick, "Tracker: associate with unknown room or member");
            return None;
        };
        if r.members.contains_key(nick) {
            warn!(room = %room, nick = %nick, "Tracker: member already in room");
            return r.members.get(nick).copied();
        }
        r.members.insert(nick.to_owned(), Privileges::default());
        m.rooms.insert(room.to_owned());
        Some(Privileges::default())
    }

    /// Unlink a member from a room.
    ///
    /// When the local identity leaves, the room goes and so does every
    /// member that no longer shares a room with us. Otherwise only `nick` is
    /// dropped, once it has no rooms left.
    pub fn dissociate(&mut self, room: &str, nick: &str) {
        let linked = self
            .rooms
            .get(room)
            .is_some_and(|r| r.members.contains_key(nick));
        if !linked {
            warn!(room = %room, nick = %nick, "Tracker: dissociate of unlinked member");
            return;
        }

        if self.is_me(nick) {
            let Some(rec) = self.rooms.remove(room) else {
                return;
            };
            for member in rec.members.keys() {
                self.unlink_member(member, room);
            }
        } else {
            if let Some(r) = self.rooms.get_mut(room) {
                r.members.remove(nick);
            }
            self.unlink_member(nick, room);
        }
    }

    /// Drop `room` from a member's set, deleting the member once it shares
    /// nothing with us.
    fn unlink_member(&mut self, nick: &str, room: &str) {
        let emptied = match self.members.get_mut(nick) {
            Some(m) => {
                m.rooms.remove(room);
                m.rooms.is_empty()
            }
            None => false,
        };
        if emptied && !self.is_me(nick) {
            self.members.remove(nick);
        }
    }

    /// A member's privileges in a room, if it is there.
    pub fn is_on(&self, room: &str, nick: &str) -> Option<Privileges> {
        self.rooms.get(room)?.members.get(nick).copied()
    }

    /// Set or clear one privilege mode (`qaohv`) on a room member.
    pub fn set_privilege(&mut self, room: &str, nick: &str, mode: char, on: bool) {
        match self.rooms.get_mut(room).and_then(|r| r.members.get_mut(nick)) {
            Some(privs) => {
                if !privs.set_flag(mode, on) {
                    warn!(room = %room, nick = %nick, mode = %mode, "Tracker: unknown privilege mode");
                }
            }
            None => warn!(room = %room, nick = %nick, "Tracker: privilege for member not in room"),
        }
    }

    /// Apply a room mode string and its arguments.
    pub fn apply_room_modes<S: AsRef<str>>(&mut self, room: &str, modes: &str, args: &[S]) {
        let Some(rec) = self.rooms.get_mut(room) else {
            warn!(room = %room, "Tracker: modes for unknown room");
            return;
        };
        for change in parse_channel_modes(modes, args) {
            match change {
                ModeChange::Flag { mode, set } => {
                    if !rec.modes.set_flag(mode, set) {
                        warn!(room = %room, mode = %mode, "Tracker: unknown room mode");
                    }
                }
                ModeChange::Key(key) => rec.modes.key = key.unwrap_or_default(),
                ModeChange::Limit(limit) => rec.modes.limit = limit.unwrap_or(0),
                ModeChange::Privilege { mode, nick, set } => match rec.members.get_mut(&nick) {
                    Some(privs) => {
                        privs.set_flag(mode, set);
                    }
                    None => {
                        warn!(room = %room, nick = %nick, mode = %mode, "Tracker: privilege for member not in room");
                    }
                },
                ModeChange::Ban { mask, set } => {
                    if ban_mask_host(&mask).is_none() {
                        debug!(room = %room, mask = %mask, "Tracker: ignoring non-host ban mask");
                    } else if set {
                        rec.bans.insert(mask);
                    } else {
                        rec.bans.remove(&mask);
                    }
                }
                ModeChange::MissingArgument { mode, set } => {
                    warn!(room = %room, mode = %mode, set, "Tracker: mode missing its argument");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> StateTracker {
        StateTracker::new("me", "ident", "My Name")
    }

    /// Every link appears on both sides, and nothing but the local identity
    /// is tracked without a room.
    fn assert_consistent(st: &StateTracker) {
        assert!(st.members.contains_key(&st.me));
        for (name, room) in &st.rooms {
            for nick in room.members.keys() {
                let m = st.members.get(nick).expect("room member must be tracked");
                assert!(m.rooms.contains(name), "{nick} missing back-link to {name}");
            }
        }
        for (nick, m) in &st.members {
            assert_eq!(&m.nick, nick);
            if nick != &st.me {
                assert!(!m.rooms.is_empty(), "{nick} shares no room");
            }
            for name in &m.rooms {
                let room = st.rooms.get(name).expect("member room must be tracked");
                assert!(room.members.contains_key(nick));
            }
        }
    }

    fn joined(st: &mut StateTracker, room: &str, nicks: &[&str]) {
        if !st.has_room(room) {
            st.new_room(room);
            st.associate(room, "me");
        }
        for nick in nicks {
            if !st.has_member(nick) {
                st.new_member(nick);
            }
            st.associate(room, nick);
        }
    }

    #[test]
    fn test_me_always_present() {
        let mut st = tracker();
        assert_eq!(st.me().nick, "me");
        assert_eq!(st.me().realname, "My Name");
        st.delete_member("me");
        assert!(st.has_member("me"));
        assert_consistent(&st);
    }

    #[test]
    fn test_new_member_idempotent() {
        let mut st = tracker();
        st.new_member("alice");
        st.nick_info("alice", "a", "host", "Alice");
        let again = st.new_member("alice");
        assert_eq!(again.host, "host");
    }

    #[test]
    fn test_associate_links_both_sides() {
        let mut st = tracker();
        joined(&mut st, "#c", &["alice"]);

        let room = st.get_room("#c").unwrap();
        assert!(room.has_member("alice"));
        assert!(room.has_member("me"));
        assert!(st.get_member("alice").unwrap().is_on("#c"));
        assert_consistent(&st);
    }

    #[test]
    fn test_rename_updates_links() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice"]);
        joined(&mut st, "#b", &["alice"]);
        st.set_privilege("#a", "alice", 'o', true);

        st.rename_member("alice", "alicia");
        assert!(!st.has_member("alice"));
        assert_eq!(st.is_on("#a", "alicia").map(|p| p.op), Some(true));
        assert!(st.is_on("#b", "alicia").is_some());
        assert_eq!(st.get_member("alicia").unwrap().nick, "alicia");
        assert_consistent(&st);
    }

    #[test]
    fn test_rename_collision_refused() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice", "bob"]);
        st.rename_member("alice", "bob");
        assert!(st.has_member("alice"));
        assert!(st.has_member("bob"));
        assert_consistent(&st);
    }

    #[test]
    fn test_rename_me() {
        let mut st = tracker();
        joined(&mut st, "#a", &[]);
        st.rename_member("me", "me_");
        assert_eq!(st.my_nick(), "me_");
        assert!(st.is_on("#a", "me_").is_some());
        assert_consistent(&st);
    }

    #[test]
    fn test_dissociate_member_deletes_when_roomless() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice", "bob"]);
        joined(&mut st, "#b", &["bob"]);

        st.dissociate("#a", "alice");
        assert!(!st.has_member("alice"));

        st.dissociate("#a", "bob");
        assert!(st.has_member("bob"));
        assert_consistent(&st);
    }

    #[test]
    fn test_dissociate_me_drops_room() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice", "bob"]);
        joined(&mut st, "#b", &["bob"]);

        st.dissociate("#a", "me");
        assert!(!st.has_room("#a"));
        assert!(!st.has_member("alice"));
        assert!(st.has_member("bob"));
        assert_eq!(st.get_member("bob").unwrap().rooms.len(), 1);
        assert_consistent(&st);
    }

    #[test]
    fn test_delete_member_removes_from_rooms() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice"]);
        joined(&mut st, "#b", &["alice"]);
        st.delete_member("alice");
        assert!(st.is_on("#a", "alice").is_none());
        assert!(st.is_on("#b", "alice").is_none());
        assert_consistent(&st);
    }

    #[test]
    fn test_room_modes() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice"]);

        st.apply_room_modes("#a", "+ntk-m+lo", &["sekrit", "25", "alice"]);
        let room = st.get_room("#a").unwrap();
        assert_eq!(room.modes.to_string(), "+tnkl sekrit 25");
        assert!(room.members["alice"].op);

        st.apply_room_modes("#a", "-k-l", &[] as &[&str]);
        assert_eq!(st.get_room("#a").unwrap().modes.to_string(), "+tn");
    }

    #[test]
    fn test_room_modes_unknown_nick_consumes_argument() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice"]);
        st.apply_room_modes("#a", "+ov", &["ghost", "alice"]);
        let privs = st.is_on("#a", "alice").unwrap();
        assert!(privs.voice);
        assert!(!privs.op);
        assert!(!st.has_member("ghost"));
    }

    #[test]
    fn test_room_modes_missing_argument() {
        let mut st = tracker();
        joined(&mut st, "#a", &[]);
        st.apply_room_modes("#a", "+kn", &[] as &[&str]);
        let modes = st.get_room("#a").unwrap().modes;
        assert!(modes.key.is_empty());
        assert!(modes.no_external);
    }

    #[test]
    fn test_bad_limit_is_zero() {
        let mut st = tracker();
        joined(&mut st, "#a", &[]);
        st.apply_room_modes("#a", "+l", &["-5"]);
        assert_eq!(st.get_room("#a").unwrap().modes.limit, 0);
    }

    #[test]
    fn test_host_bans_tag_members() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice", "bob"]);
        st.nick_info("alice", "a", "bad.example.com", "Alice");
        st.nick_info("bob", "b", "good.example.com", "Bob");

        st.apply_room_modes("#a", "+bb", &["*!*@bad.example.com", "troll!*@*"]);
        let room = st.get_room("#a").unwrap();
        assert_eq!(room.bans.len(), 1);
        assert_eq!(room.bans["*!*@bad.example.com"], vec!["alice".to_string()]);
        assert_eq!(room.bans_matching("alice"), vec!["*!*@bad.example.com"]);

        st.apply_room_modes("#a", "-b", &["*!*@bad.example.com"]);
        assert!(st.get_room("#a").unwrap().bans.is_empty());
    }

    #[test]
    fn test_user_modes() {
        let mut st = tracker();
        st.apply_user_modes("me", "+iwQ");
        let me = st.me();
        assert!(me.modes.invisible);
        assert!(me.modes.wallops);
        st.apply_user_modes("me", "-i");
        assert_eq!(st.me().modes.to_string(), "+w");
    }

    #[test]
    fn test_snapshots_are_copies() {
        let mut st = tracker();
        joined(&mut st, "#a", &["alice"]);
        let mut snap = st.get_room("#a").unwrap();
        snap.topic = "changed".into();
        snap.members.clear();
        let fresh = st.get_room("#a").unwrap();
        assert!(fresh.topic.is_empty());
        assert_eq!(fresh.members.len(), 2);
    }

    #[test]
    fn test_wipe_keeps_identity() {
        let mut st = tracker();
        st.set_my_host("host.example");
        st.apply_user_modes("me", "+i");
        joined(&mut st, "#a", &["alice"]);

        st.wipe();
        assert!(st.rooms().is_empty());
        assert_eq!(st.members().len(), 1);
        let me = st.me();
        assert_eq!(me.host, "host.example");
        assert_eq!(me.user, "ident");
        assert!(!me.modes.invisible);
        assert_consistent(&st);
    }
}
