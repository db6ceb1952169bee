//! Unified error handling for slirc-client.
//!
//! Only wire-level failures are errors. Parse failures, state
//! inconsistencies and handler panics are logged and swallowed, since the
//! client keeps best-effort state about a server that may misbehave.

use std::sync::Arc;

use thiserror::Error;

use crate::config::ConfigError;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors surfaced by [`Client`](crate::Client) operations and on its error
/// channel.
///
/// Sources are shared so a failure can be returned to the caller and
/// broadcast on the error channel at once.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("io error: {0}")]
    Io(#[source] Arc<std::io::Error>),

    #[error("codec error: {0}")]
    Codec(#[source] Arc<slirc_proto::CodecError>),

    #[error("tls error: {0}")]
    Tls(String),

    #[error("invalid server name for tls: {0}")]
    InvalidServerName(String),

    #[error("connect to {0} timed out")]
    ConnectTimeout(String),

    #[error("no data from server for {0} seconds")]
    ReadTimeout(u64),

    #[error("already connected")]
    AlreadyConnected,

    #[error("no server address configured")]
    EmptyServer,

    #[error("config error: {0}")]
    Config(#[source] Arc<ConfigError>),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<slirc_proto::CodecError> for ClientError {
    fn from(err: slirc_proto::CodecError) -> Self {
        Self::Codec(Arc::new(err))
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Arc::new(err))
    }
}

impl ClientError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Codec(_) => "codec",
            Self::Tls(_) => "tls",
            Self::InvalidServerName(_) => "invalid_server_name",
            Self::ConnectTimeout(_) => "connect_timeout",
            Self::ReadTimeout(_) => "read_timeout",
            Self::AlreadyConnected => "already_connected",
            Self::EmptyServer => "empty_server",
            Self::Config(_) => "config",
        }
    }

    /// Returns true for dial and socket failures, the kind that goes on
    /// the error channel.
    pub fn is_wire(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Codec(_)
                | Self::Tls(_)
                | Self::InvalidServerName(_)
                | Self::ConnectTimeout(_)
                | Self::ReadTimeout(_)
        )
    }
}
