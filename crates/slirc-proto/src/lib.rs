//! # slirc-proto
//!
//! The wire layer of the slirc IRC client: parsing inbound frames into
//! [`Line`]s, building outbound frames from typed [`Command`]s, and the mode
//! bookkeeping both sides need.
//!
//! ## Features
//!
//! - Frame parsing with IRCv3 tags, source prefixes and CTCP unwrapping
//! - Typed command builders with deterministic serialisation
//! - Splitting of long message bodies on clause and word boundaries
//! - Room, membership and user mode records with canonical printing
//! - Optional Tokio line codec (feature `tokio`, on by default)

#![deny(clippy::all)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing frames
//!
//! ```rust
//! use slirc_proto::Line;
//!
//! let line = Line::parse(":alice!a@example.org PRIVMSG #rust :\x01ACTION waves\x01").unwrap();
//! assert_eq!(line.verb(), "ACTION");
//! assert_eq!(line.nick(), "alice");
//! assert_eq!(line.text(), "waves");
//! ```
//!
//! ### Building frames
//!
//! ```rust
//! use slirc_proto::Command;
//!
//! let join = Command::JOIN("#rust".into(), Some("key".into()));
//! assert_eq!(join.to_string(), "JOIN #rust key");
//!
//! let frames = Command::privmsg("#rust", "hello").frames(450);
//! assert_eq!(frames, vec!["PRIVMSG #rust :hello"]);
//! ```

pub mod command;
pub mod ctcp;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod util;

pub use self::command::{split_message, verbs, Command};
pub use self::error::ParseError;
#[cfg(feature = "tokio")]
pub use self::error::CodecError;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::{Line, Tag};
pub use self::mode::{ChannelModes, ModeChange, ModeFlags, Privileges, UserModes};
pub use self::prefix::Source;
