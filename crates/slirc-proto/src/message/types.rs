//! The parsed inbound frame.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::nom_parser::ParsedLine;
use super::tags::{parse_tags, Tag};
use crate::command::verbs;
use crate::ctcp::{self, CtcpKind};
use crate::error::ParseError;
use crate::prefix::Source;
use crate::util::is_room_name;

/// One parsed frame.
///
/// A `Line` is immutable once built; handlers each receive their own clone.
/// Inbound CTCP payloads are already unwrapped: a PRIVMSG carrying
/// `\x01ACTION waves\x01` arrives with verb `ACTION` and text `waves`, and
/// any other CTCP request arrives with verb `CTCP` (`CTCPREPLY` for
/// NOTICE) and arguments `[sub-verb, target, body]`.
///
/// # Example
///
/// ```
/// use slirc_proto::Line;
///
/// let line = Line::parse(":nick!ident@host PRIVMSG #chan :hello there").unwrap();
/// assert_eq!(line.nick(), "nick");
/// assert_eq!(line.verb(), "PRIVMSG");
/// assert_eq!(line.args(), ["#chan", "hello there"]);
/// assert_eq!(line.text(), "hello there");
/// assert!(line.is_public());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    tags: Vec<Tag>,
    source: Source,
    raw_source: String,
    verb: String,
    args: Vec<String>,
    raw: String,
    time: DateTime<Utc>,
}

impl Line {
    /// Parse a frame (terminator optional), timestamped now.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        Self::parse_at(raw, Utc::now())
    }

    /// Parse a frame with an explicit timestamp.
    pub fn parse_at(raw: &str, time: DateTime<Utc>) -> Result<Self, ParseError> {
        let parsed = ParsedLine::parse(raw)?;
        let raw_source = parsed.source.unwrap_or_default();

        let mut line = Line {
            tags: parsed.tags.map(parse_tags).unwrap_or_default(),
            source: Source::parse(raw_source),
            raw_source: raw_source.to_owned(),
            verb: parsed.verb.to_ascii_uppercase(),
            args: parsed.params.iter().map(|p| (*p).to_owned()).collect(),
            raw: raw.trim_end_matches(['\r', '\n']).to_owned(),
            time,
        };
        line.unwrap_ctcp();
        Ok(line)
    }

    /// Build a line the client dispatches to itself (`REGISTER`,
    /// `CONNECTED`, `DISCONNECTED`).
    pub fn synthetic(verb: &str, time: DateTime<Utc>) -> Self {
        Line {
            tags: Vec::new(),
            source: Source::default(),
            raw_source: String::new(),
            verb: verb.to_ascii_uppercase(),
            args: Vec::new(),
            raw: String::new(),
            time,
        }
    }

    /// Rewrite PRIVMSG/NOTICE lines whose text is a CTCP payload.
    fn unwrap_ctcp(&mut self) {
        if self.verb != verbs::PRIVMSG && self.verb != verbs::NOTICE {
            return;
        }
        let Some((kind, body)) = self.args.last().and_then(|text| ctcp::unwrap(text)) else {
            return;
        };
        let body = body.unwrap_or_default().to_owned();
        if let Some(last) = self.args.last_mut() {
            *last = body;
        }

        if kind == CtcpKind::Action && self.verb == verbs::PRIVMSG {
            self.verb = verbs::ACTION.to_owned();
        } else {
            self.verb = if self.verb == verbs::PRIVMSG {
                verbs::CTCP.to_owned()
            } else {
                verbs::CTCPREPLY.to_owned()
            };
            self.args.insert(0, kind.as_str().to_owned());
        }
    }

    /// Message tags, in wire order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Value of the tag `key`, if present and valued.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|Tag(k, _)| k == key)
            .and_then(|Tag(_, v)| v.as_deref())
    }

    /// The split source.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The source exactly as received, without the leading `:`.
    pub fn raw_source(&self) -> &str {
        &self.raw_source
    }

    /// Sender nick, empty for server sources.
    pub fn nick(&self) -> &str {
        &self.source.nick
    }

    /// Sender login identifier, empty for server sources.
    pub fn ident(&self) -> &str {
        &self.source.user
    }

    /// Sender host, or the whole source for server sources.
    pub fn host(&self) -> &str {
        &self.source.host
    }

    /// Uppercased verb or numeric.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// All arguments, trailing last.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Argument `idx`, if present.
    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }

    /// Returns true if the line carries at least `n` arguments.
    pub fn has_args(&self, n: usize) -> bool {
        self.args.len() >= n
    }

    /// The frame as received, without its terminator. Empty for synthetic lines.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// When the frame was parsed.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// The last argument, or `""`.
    pub fn text(&self) -> &str {
        self.args.last().map_or("", String::as_str)
    }

    /// Returns true if a message went to a room rather than to us.
    pub fn is_public(&self) -> bool {
        let target = match self.verb.as_str() {
            verbs::PRIVMSG | verbs::NOTICE | verbs::ACTION => self.arg(0),
            verbs::CTCP | verbs::CTCPREPLY => self.arg(1),
            _ => None,
        };
        target.is_some_and(is_room_name)
    }

    /// Where a reply to this line should go.
    ///
    /// For messages that is the room if public and the sender otherwise. For
    /// everything else it is the first argument.
    pub fn target(&self) -> &str {
        match self.verb.as_str() {
            verbs::PRIVMSG | verbs::NOTICE | verbs::ACTION if !self.is_public() => self.nick(),
            verbs::CTCP | verbs::CTCPREPLY if !self.is_public() => self.nick(),
            verbs::CTCP | verbs::CTCPREPLY => self.arg(1).unwrap_or_default(),
            _ => self.arg(0).unwrap_or_default(),
        }
    }

    /// A copy of this line with its last argument replaced.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        let mut line = self.clone();
        match line.args.last_mut() {
            Some(last) => *last = text.into(),
            None => line.args.push(text.into()),
        }
        line
    }

    /// A copy of this line with the given arguments, for synthetic events.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl FromStr for Line {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Line::parse(s)
    }
}
