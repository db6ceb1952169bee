//! Runtime hooks that cannot come from a config file.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::defaults::default_new_nick;
use crate::dispatch::HandlerPanic;

/// Timestamp source for parsed lines and keepalive pings.
pub type ClockFn = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Replaces the default error log when a handler panics.
pub type RecoverFn = Arc<dyn Fn(&HandlerPanic) + Send + Sync>;

/// Produces the next nick to try after a nick collision.
pub type NewNickFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Caller-supplied behaviour for a [`Client`](crate::Client).
#[derive(Clone)]
pub struct Hooks {
    pub clock: ClockFn,
    pub recover: Option<RecoverFn>,
    pub new_nick: NewNickFn,
    /// TLS client settings. Overrides `tls_ca_file` and `tls_verify` when set.
    pub tls_config: Option<Arc<tokio_rustls::rustls::ClientConfig>>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            clock: Arc::new(Utc::now),
            recover: None,
            new_nick: Arc::new(default_new_nick),
            tls_config: None,
        }
    }
}

impl Hooks {
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_recover(mut self, recover: impl Fn(&HandlerPanic) + Send + Sync + 'static) -> Self {
        self.recover = Some(Arc::new(recover));
        self
    }

    pub fn with_new_nick(mut self, new_nick: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.new_nick = Arc::new(new_nick);
        self
    }

    pub fn with_tls_config(mut self, tls: Arc<tokio_rustls::rustls::ClientConfig>) -> Self {
        self.tls_config = Some(tls);
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("recover", &self.recover.is_some())
            .field("tls_config", &self.tls_config.is_some())
            .finish_non_exhaustive()
    }
}
