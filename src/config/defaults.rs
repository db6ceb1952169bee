//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use slirc_proto::command::DEFAULT_SPLIT_LEN;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Identity Defaults
// =============================================================================

pub fn default_nick() -> String {
    "slirc".to_string()
}

pub fn default_user() -> String {
    "slirc".to_string()
}

pub fn default_realname() -> String {
    "slirc-client".to_string()
}

pub fn default_version() -> String {
    concat!("slirc-client ", env!("CARGO_PKG_VERSION")).to_string()
}

// =============================================================================
// Connection Defaults
// =============================================================================

pub fn default_split_len() -> usize {
    DEFAULT_SPLIT_LEN
}

pub fn default_ping_interval() -> u64 {
    180
}

pub fn default_read_timeout() -> u64 {
    300
}

pub fn default_connect_timeout() -> u64 {
    30
}

pub fn default_send_queue() -> usize {
    64
}

/// Default nick-collision strategy: append an underscore.
pub fn default_new_nick(old: &str) -> String {
    format!("{old}_")
}
