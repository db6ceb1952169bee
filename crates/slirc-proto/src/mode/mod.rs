//! Room, membership and user modes.

mod parse;
mod types;

pub use self::parse::{parse_channel_modes, parse_user_modes, ModeChange, PRIVILEGE_MODES};
pub use self::types::{ChannelModes, FlagSpec, ModeFlags, Privileges, UserModes, NO_MODES};
