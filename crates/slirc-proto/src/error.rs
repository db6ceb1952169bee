//! Error types for the line codec.
//!
//! Parse failures are never fatal to a connection: callers log them and
//! drop the frame. Codec errors wrap the underlying transport failure.

use thiserror::Error;

/// Convenience type alias for Results using [`ParseError`].
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Errors encountered when parsing a single inbound frame.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// Frame was empty (or only whitespace and tags).
    #[error("empty line")]
    EmptyLine,

    /// A source prefix was present but no verb followed it.
    #[error("missing command after source prefix")]
    MissingCommand,

    /// The verb was neither a word nor a three-digit numeric.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A `:` or `@` introducer was not terminated by a space.
    #[error("unterminated {0} section")]
    Unterminated(&'static str),
}

/// Errors produced by [`LineCodec`](crate::line::LineCodec).
#[cfg(feature = "tokio")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
