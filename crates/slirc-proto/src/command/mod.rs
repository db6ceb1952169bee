//! Outbound commands: typed builders, serialisation and splitting.

mod serialize;
mod split;
mod types;
pub mod verbs;

pub use self::split::{split_message, DEFAULT_SPLIT_LEN, ELLIPSIS, MIN_SPLIT_LEN};
pub use self::types::Command;
