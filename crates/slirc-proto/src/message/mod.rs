//! Inbound frame parsing.

mod nom_parser;
/// IRCv3 tag utilities.
pub mod tags;
mod types;

pub use self::tags::Tag;
pub use self::types::Line;
