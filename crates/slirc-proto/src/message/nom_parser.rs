//! Nom-based frame parser.
//!
//! Splits one frame (terminator already removed) into borrowed slices.
//! Building the owned [`Line`](super::Line) happens in the parent module.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::error::ParseError;

/// Parse IRCv3 message tags (the part after `@` and before the first space).
fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

/// Parse the source prefix (the part after `:` and before the first space).
fn parse_source(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the verb token, up to the next space.
fn parse_verb(input: &str) -> IResult<&str, &str> {
    take_while1(|c| c != ' ')(input)
}

/// A verb is `1*letter` or `3digit`.
fn is_valid_verb(verb: &str) -> bool {
    let all_letters = verb.chars().all(|c| c.is_ascii_alphabetic());
    let three_digits = verb.len() == 3 && verb.chars().all(|c| c.is_ascii_digit());
    all_letters || three_digits
}

/// Parse the argument list that follows the verb.
///
/// Middles are separated by runs of spaces. The first argument that starts
/// with `:` is the trailing one and runs to the end of the frame, spaces and
/// colons included. An empty trailing (`PRIVMSG #c :`) is kept as `""`.
fn parse_params(input: &str) -> SmallVec<[&str; 15]> {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    while rest.starts_with(' ') {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// A parsed frame with borrowed string slices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedLine<'a> {
    /// Raw tags string (without the leading `@`), if present.
    pub tags: Option<&'a str>,
    /// Raw source string (without the leading `:`), if present.
    pub source: Option<&'a str>,
    /// The verb exactly as it appeared on the wire.
    pub verb: &'a str,
    /// Arguments, with the trailing one last.
    pub params: SmallVec<[&'a str; 15]>,
}

impl<'a> ParsedLine<'a> {
    /// Parse a frame into borrowed components.
    pub fn parse(input: &'a str) -> Result<Self, ParseError> {
        let input = input.trim_end_matches(['\r', '\n']);
        if input.trim().is_empty() {
            return Err(ParseError::EmptyLine);
        }

        let (rest, tags) = opt(parse_tags)(input)
            .map_err(|_: nom::Err<nom::error::Error<&str>>| ParseError::Unterminated("tags"))?;
        if input.starts_with('@') && tags.is_none() {
            return Err(ParseError::Unterminated("tags"));
        }
        let (rest, _) = space0::<_, nom::error::Error<&str>>(rest)
            .map_err(|_| ParseError::EmptyLine)?;

        let (rest, source) = opt(parse_source)(rest)
            .map_err(|_: nom::Err<nom::error::Error<&str>>| ParseError::Unterminated("source"))?;
        let (rest, _) = space0::<_, nom::error::Error<&str>>(rest)
            .map_err(|_| ParseError::EmptyLine)?;

        let (rest, verb) = match parse_verb(rest) {
            Ok(parsed) => parsed,
            Err(_) if source.is_some() => return Err(ParseError::MissingCommand),
            Err(_) => return Err(ParseError::EmptyLine),
        };
        if !is_valid_verb(verb) {
            return Err(ParseError::InvalidCommand(verb.to_owned()));
        }

        Ok(ParsedLine {
            tags,
            source,
            verb,
            params: parse_params(rest),
        })
    }
}
