//! Prometheus metrics collection for slirc-client.
//!
//! Embedders that already run a Prometheus exporter can call [`init`] once
//! and serve [`gather_metrics`] next to their own metrics. Until [`init`]
//! runs every `record_*` function is a no-op.
//!
//! - `irc_client_lines_received_total` - Frames read from the server
//! - `irc_client_lines_sent_total` - Frames written to the server
//! - `irc_client_parse_failures_total` - Frames dropped by the parser
//! - `irc_client_flood_delays_total` - Pacing sleeps taken by the sender
//! - `irc_client_wire_errors_total{error}` - Connection-fatal errors by kind
//! - `irc_client_handler_panics_total{verb}` - Handler panics by verb
//! - `irc_client_dispatch_duration_seconds{verb}` - Dispatch latency by verb

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Frames read from the server.
pub static LINES_RECEIVED: OnceLock<IntCounter> = OnceLock::new();

/// Frames written to the server.
pub static LINES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Frames the parser rejected.
pub static PARSE_FAILURES: OnceLock<IntCounter> = OnceLock::new();

/// Times the flood pacer slept before a write.
pub static FLOOD_DELAYS: OnceLock<IntCounter> = OnceLock::new();

/// Connection-fatal errors by error code.
pub static WIRE_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler panics by verb.
pub static HANDLER_PANICS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Time from dispatch start to the end of the foreground phase, by verb.
pub static DISPATCH_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; later calls leave the first registration in
/// place.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(LINES_RECEIVED, IntCounter::new("irc_client_lines_received_total", "Frames read from the server"));
    register!(LINES_SENT, IntCounter::new("irc_client_lines_sent_total", "Frames written to the server"));
    register!(PARSE_FAILURES, IntCounter::new("irc_client_parse_failures_total", "Frames dropped by the parser"));
    register!(FLOOD_DELAYS, IntCounter::new("irc_client_flood_delays_total", "Pacing sleeps taken by the sender"));
    register!(WIRE_ERRORS, IntCounterVec::new(Opts::new("irc_client_wire_errors_total", "Connection-fatal errors by kind"), &["error"]));
    register!(HANDLER_PANICS, IntCounterVec::new(Opts::new("irc_client_handler_panics_total", "Handler panics by verb"), &["verb"]));
    register!(DISPATCH_LATENCY, HistogramVec::new(
        HistogramOpts::new("irc_client_dispatch_duration_seconds", "Line dispatch latency by verb")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["verb"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

fn inc(metric: &OnceLock<IntCounter>) {
    if let Some(c) = metric.get() {
        c.inc();
    }
}

#[inline]
pub fn record_line_received() {
    inc(&LINES_RECEIVED);
}

#[inline]
pub fn record_line_sent() {
    inc(&LINES_SENT);
}

#[inline]
pub fn record_parse_failure() {
    inc(&PARSE_FAILURES);
}

#[inline]
pub fn record_flood_delay() {
    inc(&FLOOD_DELAYS);
}

/// Record a connection-fatal error under its error code.
#[inline]
pub fn record_wire_error(code: &str) {
    if let Some(c) = WIRE_ERRORS.get() {
        c.with_label_values(&[code]).inc();
    }
}

#[inline]
pub fn record_handler_panic(verb: &str) {
    if let Some(c) = HANDLER_PANICS.get() {
        c.with_label_values(&[verb]).inc();
    }
}

/// Record how long one line took to dispatch.
#[inline]
pub fn record_dispatch(verb: &str, duration_secs: f64) {
    if let Some(h) = DISPATCH_LATENCY.get() {
        h.with_label_values(&[verb]).observe(duration_secs);
    }
}
