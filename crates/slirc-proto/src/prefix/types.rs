//! Source prefix splitting.
//!
//! A frame's source identifies its origin. It is either a bare host (a
//! server, usually) or a user's `nick!user@host` mask.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::fmt;

/// The origin of a frame, split into its three components.
///
/// When the raw prefix does not contain `!` followed later by `@`, the
/// whole prefix is treated as the host and `nick`/`user` stay empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Source {
    /// Nickname part, empty for server sources.
    pub nick: String,
    /// Login identifier part, empty for server sources.
    pub user: String,
    /// Hostname, or the whole prefix for server sources.
    pub host: String,
}

impl Source {
    /// Split a raw prefix (without its leading `:`).
    ///
    /// ```
    /// use slirc_proto::prefix::Source;
    ///
    /// let src = Source::parse("nick!ident@host.example.com");
    /// assert_eq!(src.nick, "nick");
    /// assert_eq!(src.user, "ident");
    /// assert_eq!(src.host, "host.example.com");
    ///
    /// let server = Source::parse("irc.example.com");
    /// assert!(server.nick.is_empty());
    /// assert_eq!(server.host, "irc.example.com");
    /// ```
    pub fn parse(raw: &str) -> Self {
        match (raw.find('!'), raw.find('@')) {
            (Some(bang), Some(at)) if bang < at => Self {
                nick: raw[..bang].to_owned(),
                user: raw[bang + 1..at].to_owned(),
                host: raw[at + 1..].to_owned(),
            },
            _ => Self {
                host: raw.to_owned(),
                ..Self::default()
            },
        }
    }

    /// Returns true if this source carries a user mask rather than a bare host.
    pub fn is_user(&self) -> bool {
        !self.nick.is_empty()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_user() {
            write!(f, "{}!{}@{}", self.nick, self.user, self.host)
        } else {
            f.write_str(&self.host)
        }
    }
}
