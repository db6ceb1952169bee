//! CTCP (Client-to-Client Protocol) payloads.
//!
//! CTCP requests ride inside PRIVMSG and CTCP replies inside NOTICE. The
//! payload is delimited by `\x01` on both ends. [`unwrap`] recognises
//! such payloads in inbound text, [`wrap`] builds them for outbound frames.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>
//!
//! # Example
//!
//! ```
//! use slirc_proto::ctcp::{self, CtcpKind};
//!
//! let (kind, body) = ctcp::unwrap("\x01ACTION waves hello\x01").unwrap();
//! assert_eq!(kind, CtcpKind::Action);
//! assert_eq!(body, Some("waves hello"));
//!
//! assert_eq!(ctcp::wrap("version", None), "\x01VERSION\x01");
//! ```

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// CTCP sub-verbs the client reacts to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// ACTION - describes an action performed by the user (`/me`).
    Action,
    /// VERSION - requests client version information.
    Version,
    /// PING - measures round-trip latency.
    Ping,
    /// TIME - requests local time from the client.
    Time,
    /// Any other sub-verb, uppercased.
    Other(String),
}

impl CtcpKind {
    /// Parse a sub-verb, case-insensitively.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ACTION" => Self::Action,
            "VERSION" => Self::Version,
            "PING" => Self::Ping,
            "TIME" => Self::Time,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the canonical uppercase name of this sub-verb.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "ACTION",
            Self::Version => "VERSION",
            Self::Ping => "PING",
            Self::Time => "TIME",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for CtcpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `text` is a delimited CTCP payload.
///
/// The payload must be longer than the two delimiters alone.
pub fn is_ctcp(text: &str) -> bool {
    text.len() > 2 && text.starts_with(CTCP_DELIM) && text.ends_with(CTCP_DELIM)
}

/// Split a delimited payload into its sub-verb and optional body.
///
/// Returns `None` when `text` is not a CTCP payload. The body is whatever
/// follows the first space inside the delimiters.
pub fn unwrap(text: &str) -> Option<(CtcpKind, Option<&str>)> {
    if !is_ctcp(text) {
        return None;
    }
    let inner = text.trim_matches(CTCP_DELIM);
    let (sub, body) = match inner.split_once(' ') {
        Some((sub, body)) => (sub, Some(body)),
        None => (inner, None),
    };
    Some((CtcpKind::parse(sub), body))
}

/// Build a delimited payload: `\x01SUB[ body]\x01`, sub-verb uppercased.
pub fn wrap(sub: &str, body: Option<&str>) -> String {
    let sub = sub.to_ascii_uppercase();
    match body {
        Some(body) if !body.is_empty() => format!("{CTCP_DELIM}{sub} {body}{CTCP_DELIM}"),
        _ => format!("{CTCP_DELIM}{sub}{CTCP_DELIM}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_with_body() {
        assert_eq!(
            unwrap("\x01PING 12345\x01"),
            Some((CtcpKind::Ping, Some("12345")))
        );
    }

    #[test]
    fn test_unwrap_without_body() {
        assert_eq!(unwrap("\x01version\x01"), Some((CtcpKind::Version, None)));
    }

    #[test]
    fn test_unwrap_rejects_plain_text() {
        assert_eq!(unwrap("hello"), None);
        assert_eq!(unwrap("\x01\x01"), None);
        assert_eq!(unwrap("\x01PING"), None);
    }

    #[test]
    fn test_unknown_kind_is_uppercased() {
        let (kind, _) = unwrap("\x01clientinfo\x01").unwrap();
        assert_eq!(kind, CtcpKind::Other("CLIENTINFO".into()));
        assert_eq!(kind.to_string(), "CLIENTINFO");
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("ping", Some("1 2")), "\x01PING 1 2\x01");
        assert_eq!(wrap("VERSION", Some("")), "\x01VERSION\x01");
    }
}
