//! Core client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use slirc_proto::command::{DEFAULT_SPLIT_LEN, MIN_SPLIT_LEN};
use thiserror::Error;

use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Connection configuration.
///
/// Every field has a default, so a TOML file only needs the fields it
/// changes:
///
/// ```toml
/// nick = "slircbot"
/// server = "irc.libera.chat"
/// tls = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Initial nick.
    pub nick: String,
    /// Login identifier sent in USER.
    pub user: String,
    /// Real name sent in USER.
    pub realname: String,
    /// `host` or `host:port`. The port defaults to 6667, or 6697 with TLS.
    pub server: String,
    /// Connection password, sent as PASS before NICK/USER.
    pub password: Option<String>,
    /// Wrap the connection in TLS.
    pub tls: bool,
    /// PEM bundle of trust roots. The platform store is used when unset.
    pub tls_ca_file: Option<PathBuf>,
    /// Verify the server certificate.
    pub tls_verify: bool,
    /// Pace outbound frames to stay clear of server flood limits.
    pub flood_protection: bool,
    /// Longest message body per frame before splitting.
    pub split_len: usize,
    /// QUIT message used when the caller gives none.
    pub quit_message: String,
    /// Reply to CTCP VERSION.
    pub version: String,
    /// Seconds between keepalive PINGs. Zero disables them.
    pub ping_interval_secs: u64,
    /// Seconds without inbound data before the connection is dropped.
    pub read_timeout_secs: u64,
    /// Seconds allowed for TCP connect plus TLS handshake.
    pub connect_timeout_secs: u64,
    /// Outbound queue capacity. Senders wait when it is full.
    pub send_queue: usize,
    /// Track rooms and members.
    pub track_state: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            user: default_user(),
            realname: default_realname(),
            server: String::new(),
            password: None,
            tls: false,
            tls_ca_file: None,
            tls_verify: default_true(),
            flood_protection: default_true(),
            split_len: default_split_len(),
            quit_message: String::new(),
            version: default_version(),
            ping_interval_secs: default_ping_interval(),
            read_timeout_secs: default_read_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            send_queue: default_send_queue(),
            track_state: default_true(),
        }
    }
}

impl ClientConfig {
    /// Defaults with the given nick.
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// The split length actually used: values below the minimum fall back
    /// to the default.
    pub fn effective_split_len(&self) -> usize {
        if self.split_len < MIN_SPLIT_LEN {
            DEFAULT_SPLIT_LEN
        } else {
            self.split_len
        }
    }

    /// `server` with the default port appended when it has none.
    pub fn server_addr(&self) -> String {
        let port = if self.tls { 6697 } else { 6667 };
        let has_port = match self.server.rsplit_once(':') {
            // Bracketed IPv6 literal: only a port after the bracket counts.
            Some((host, p)) if host.starts_with('[') => host.ends_with(']') && !p.is_empty(),
            Some((host, _)) => !host.contains(':'),
            None => false,
        };
        if has_port {
            self.server.clone()
        } else {
            format!("{}:{port}", self.server)
        }
    }

    /// The read deadline as a duration.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// The connect deadline as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// The keepalive interval, or `None` when disabled.
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }
}
