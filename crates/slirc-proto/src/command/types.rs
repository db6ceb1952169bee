//! Outbound command types.
//!
//! Each variant serialises to exactly one frame through `Display`. Message
//! bodies may be split into several frames with
//! [`Command::frames`](Command::frames).
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol

/// An outbound IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Command {
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER ident 12 * :realname`
    USER(String, String),
    /// `JOIN channel [key]`
    JOIN(String, Option<String>),
    /// `PART channel [:message]`
    PART(String, Option<String>),
    /// `KICK channel nick [:message]`
    KICK(String, String, Option<String>),
    /// `QUIT [:message]`
    QUIT(Option<String>),
    /// `WHOIS nick`
    WHOIS(String),
    /// `WHO target`
    WHO(String),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),
    /// CTCP request in a PRIVMSG: target, sub-verb, optional body.
    CTCP(String, String, Option<String>),
    /// CTCP reply in a NOTICE: target, sub-verb, optional body.
    CTCPREPLY(String, String, Option<String>),
    /// `TOPIC channel [:topic]`
    TOPIC(String, Option<String>),
    /// `MODE target [modes...]`
    MODE(String, Vec<String>),
    /// `AWAY [:message]`; `None` marks the user as back.
    AWAY(Option<String>),
    /// `INVITE nick channel`
    INVITE(String, String),
    /// `OPER user password`
    OPER(String, String),
    /// `VHOST user password`
    VHOST(String, String),
    /// `PING :payload`
    PING(String),
    /// `PONG :payload`
    PONG(String),
    /// A caller-supplied frame, cut at its first CR or LF.
    Raw(String),
}

impl Command {
    /// CTCP ACTION (`/me`) towards `target`.
    pub fn action(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::CTCP(target.into(), "ACTION".into(), Some(text.into()))
    }

    /// CTCP VERSION request towards `target`.
    pub fn version(target: impl Into<String>) -> Self {
        Command::CTCP(target.into(), "VERSION".into(), None)
    }

    /// Plain message to `target`.
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into())
    }

    /// Notice to `target`.
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::NOTICE(target.into(), text.into())
    }

    /// The wire verb this command serialises to.
    pub fn verb(&self) -> &'static str {
        use super::verbs;
        match self {
            Command::PASS(_) => verbs::PASS,
            Command::NICK(_) => verbs::NICK,
            Command::USER(..) => verbs::USER,
            Command::JOIN(..) => verbs::JOIN,
            Command::PART(..) => verbs::PART,
            Command::KICK(..) => verbs::KICK,
            Command::QUIT(_) => verbs::QUIT,
            Command::WHOIS(_) => verbs::WHOIS,
            Command::WHO(_) => verbs::WHO,
            Command::PRIVMSG(..) | Command::CTCP(..) => verbs::PRIVMSG,
            Command::NOTICE(..) | Command::CTCPREPLY(..) => verbs::NOTICE,
            Command::TOPIC(..) => verbs::TOPIC,
            Command::MODE(..) => verbs::MODE,
            Command::AWAY(_) => verbs::AWAY,
            Command::INVITE(..) => verbs::INVITE,
            Command::OPER(..) => verbs::OPER,
            Command::VHOST(..) => verbs::VHOST,
            Command::PING(_) => verbs::PING,
            Command::PONG(_) => verbs::PONG,
            Command::Raw(_) => "",
        }
    }

    /// Returns true for commands whose body may be split across frames.
    pub fn is_splittable(&self) -> bool {
        matches!(
            self,
            Command::PRIVMSG(..) | Command::NOTICE(..) | Command::CTCP(..) | Command::CTCPREPLY(..)
        )
    }
}
