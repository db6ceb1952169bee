//! Mode flag records for rooms, memberships and users.
//!
//! Every record pairs its boolean fields with mode characters through a
//! static table. Printing walks that table, so the canonical mode string
//! always lists enabled flags in declaration order.
//!
//! # Reference
//! - RFC 2811 Section 4 (Channel Modes)
//! - RFC 2812 Section 3.1.5 (User Modes)

use std::fmt;

/// Text printed for a record with nothing set.
pub const NO_MODES: &str = "No modes set";

/// One row of a flag table: the mode character and its field accessors.
pub struct FlagSpec<T> {
    /// Mode character on the wire.
    pub mode: char,
    /// Read the flag.
    pub get: fn(&T) -> bool,
    /// Write the flag.
    pub set: fn(&mut T, bool),
}

/// Records made of boolean mode flags.
pub trait ModeFlags: Sized + 'static {
    /// The `(char, field)` table, in declaration order.
    const FLAGS: &'static [FlagSpec<Self>];

    /// Set or clear the flag for `mode`. Returns false for unknown characters.
    fn set_flag(&mut self, mode: char, on: bool) -> bool {
        match Self::FLAGS.iter().find(|spec| spec.mode == mode) {
            Some(spec) => {
                (spec.set)(self, on);
                true
            }
            None => false,
        }
    }

    /// Read the flag for `mode`, or `None` for unknown characters.
    fn flag(&self, mode: char) -> Option<bool> {
        Self::FLAGS
            .iter()
            .find(|spec| spec.mode == mode)
            .map(|spec| (spec.get)(self))
    }

    /// Enabled flag characters, in declaration order.
    fn flag_chars(&self) -> String {
        Self::FLAGS
            .iter()
            .filter(|spec| (spec.get)(self))
            .map(|spec| spec.mode)
            .collect()
    }
}

/// Write `+chars` or [`NO_MODES`].
fn write_flags<T: ModeFlags>(record: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let chars = record.flag_chars();
    if chars.is_empty() {
        f.write_str(NO_MODES)
    } else {
        write!(f, "+{chars}")
    }
}

/// Room (channel) modes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelModes {
    /// `p`
    pub private: bool,
    /// `s`
    pub secret: bool,
    /// `t`: only ops may change the topic.
    pub protected_topic: bool,
    /// `n`: no messages from outside the room.
    pub no_external: bool,
    /// `m`
    pub moderated: bool,
    /// `i`
    pub invite_only: bool,
    /// `O`
    pub oper_only: bool,
    /// `z`: only TLS users may join.
    pub ssl_only: bool,
    /// `r`
    pub registered: bool,
    /// `Z`: every member is on TLS.
    pub all_ssl: bool,
    /// `k`, empty when unset.
    pub key: String,
    /// `l`, zero when unset.
    pub limit: u32,
}

impl ModeFlags for ChannelModes {
    const FLAGS: &'static [FlagSpec<Self>] = &[
        FlagSpec { mode: 'p', get: |m| m.private, set: |m, on| m.private = on },
        FlagSpec { mode: 's', get: |m| m.secret, set: |m, on| m.secret = on },
        FlagSpec { mode: 't', get: |m| m.protected_topic, set: |m, on| m.protected_topic = on },
        FlagSpec { mode: 'n', get: |m| m.no_external, set: |m, on| m.no_external = on },
        FlagSpec { mode: 'm', get: |m| m.moderated, set: |m, on| m.moderated = on },
        FlagSpec { mode: 'i', get: |m| m.invite_only, set: |m, on| m.invite_only = on },
        FlagSpec { mode: 'O', get: |m| m.oper_only, set: |m, on| m.oper_only = on },
        FlagSpec { mode: 'z', get: |m| m.ssl_only, set: |m, on| m.ssl_only = on },
        FlagSpec { mode: 'r', get: |m| m.registered, set: |m, on| m.registered = on },
        FlagSpec { mode: 'Z', get: |m| m.all_ssl, set: |m, on| m.all_ssl = on },
    ];
}

impl fmt::Display for ChannelModes {
    /// `+<flags>[k][l] [key] [limit]`, or [`NO_MODES`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = self.flag_chars();
        let mut args = Vec::new();
        if !self.key.is_empty() {
            chars.push('k');
            args.push(self.key.clone());
        }
        if self.limit != 0 {
            chars.push('l');
            args.push(self.limit.to_string());
        }
        if chars.is_empty() {
            return f.write_str(NO_MODES);
        }
        write!(f, "+{chars}")?;
        for arg in args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A member's privileges in one room.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Privileges {
    /// `q` (`~`)
    pub owner: bool,
    /// `a` (`&`)
    pub admin: bool,
    /// `o` (`@`)
    pub op: bool,
    /// `h` (`%`)
    pub half_op: bool,
    /// `v` (`+`)
    pub voice: bool,
}

impl Privileges {
    /// Map a NAMES reply prefix (`~&@%+`) to its mode character.
    pub fn prefix_mode(prefix: char) -> Option<char> {
        match prefix {
            '~' => Some('q'),
            '&' => Some('a'),
            '@' => Some('o'),
            '%' => Some('h'),
            '+' => Some('v'),
            _ => None,
        }
    }

    /// Returns true if no privilege is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ModeFlags for Privileges {
    const FLAGS: &'static [FlagSpec<Self>] = &[
        FlagSpec { mode: 'q', get: |p| p.owner, set: |p, on| p.owner = on },
        FlagSpec { mode: 'a', get: |p| p.admin, set: |p, on| p.admin = on },
        FlagSpec { mode: 'o', get: |p| p.op, set: |p, on| p.op = on },
        FlagSpec { mode: 'h', get: |p| p.half_op, set: |p, on| p.half_op = on },
        FlagSpec { mode: 'v', get: |p| p.voice, set: |p, on| p.voice = on },
    ];
}

impl fmt::Display for Privileges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flags(self, f)
    }
}

/// User modes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserModes {
    /// `i`
    pub invisible: bool,
    /// `o`
    pub oper: bool,
    /// `w`
    pub wallops: bool,
    /// `x`
    pub hidden_host: bool,
    /// `z`: connected over TLS.
    pub ssl: bool,
    /// `B`
    pub bot: bool,
}

impl ModeFlags for UserModes {
    const FLAGS: &'static [FlagSpec<Self>] = &[
        FlagSpec { mode: 'i', get: |u| u.invisible, set: |u, on| u.invisible = on },
        FlagSpec { mode: 'o', get: |u| u.oper, set: |u, on| u.oper = on },
        FlagSpec { mode: 'w', get: |u| u.wallops, set: |u, on| u.wallops = on },
        FlagSpec { mode: 'x', get: |u| u.hidden_host, set: |u, on| u.hidden_host = on },
        FlagSpec { mode: 'z', get: |u| u.ssl, set: |u, on| u.ssl = on },
        FlagSpec { mode: 'B', get: |u| u.bot, set: |u, on| u.bot = on },
    ];
}

impl fmt::Display for UserModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flags(self, f)
    }
}
