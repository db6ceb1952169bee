//! Telemetry utilities: dispatch timing, span constructors and subscriber
//! setup.

use std::time::Instant;

use tracing_subscriber::EnvFilter;

/// Guard for timing one line's dispatch and recording metrics.
///
/// Records dispatch latency when dropped.
pub struct DispatchTimer {
    verb: String,
    start: Instant,
}

impl DispatchTimer {
    /// Start timing a dispatch.
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for DispatchTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_dispatch(&self.verb, duration);
    }
}

/// Standardized span constructors for client observability.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Create a span for one connection's tasks.
    pub fn connection(server: &str) -> Span {
        info_span!("connection", server = %server)
    }

    /// Create a span for dispatching one line.
    pub fn dispatch(verb: &str) -> Span {
        debug_span!("dispatch", verb = %verb)
    }
}

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
