//! Prometheus metrics collection for orbd.
//!
//! Exposed on an HTTP endpoint when `bridge.metrics_port` is non-zero.
//!
//! ## Bridge Metrics
//!
//! - `orb_request_total{method}` - Bridge requests by method
//! - `orb_request_duration_seconds{method}` - Request latency histogram
//! - `orb_request_errors_total{method, error}` - Failed requests by error kind
//! - `orb_events_total{event}` - Events delivered to the sink
//! - `orb_ait_sections_total{result}` - AIT sections synthesised

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Capability tokens minted.
pub static TOKENS_MINTED: OnceLock<IntCounter> = OnceLock::new();

/// Bridge requests by method.
pub static REQUEST_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Bridge request errors by method and error kind.
pub static REQUEST_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Events dispatched to the sink by name.
pub static EVENTS_DISPATCHED: OnceLock<IntCounterVec> = OnceLock::new();

/// AIT sections by outcome.
pub static AIT_SECTIONS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Currently connected gateway clients.
pub static CONNECTED_CLIENTS: OnceLock<IntGauge> = OnceLock::new();

/// Request latency by method.
pub static REQUEST_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup; later calls only log registration conflicts.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                let m = $init.expect(concat!(stringify!($metric), " creation failed"));
                if let Err(e) = r.register(Box::new(m.clone())) {
                    tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                }
                let _ = $metric.set(m);
            }
        };
    }

    register!(TOKENS_MINTED, IntCounter::new("orb_tokens_minted_total", "Capability tokens minted"));
    register!(REQUEST_COUNTER, IntCounterVec::new(Opts::new("orb_request_total", "Bridge requests by method"), &["method"]));
    register!(REQUEST_LATENCY, HistogramVec::new(
        HistogramOpts::new("orb_request_duration_seconds", "Bridge request latency by method")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        &["method"]));
    register!(REQUEST_ERRORS, IntCounterVec::new(Opts::new("orb_request_errors_total", "Bridge request errors"), &["method", "error"]));
    register!(EVENTS_DISPATCHED, IntCounterVec::new(Opts::new("orb_events_total", "Events dispatched to the hosted application"), &["event"]));
    register!(AIT_SECTIONS, IntCounterVec::new(Opts::new("orb_ait_sections_total", "AIT sections synthesised"), &["result"]));
    register!(CONNECTED_CLIENTS, IntGauge::new("orb_connected_clients", "Currently connected gateway clients"));
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
// Helper functions
// ============================================================================

/// Record a completed bridge request with latency.
#[inline]
pub fn record_request(method: &str, duration_secs: f64) {
    if let Some(c) = REQUEST_COUNTER.get() {
        c.with_label_values(&[method]).inc();
    }
    if let Some(h) = REQUEST_LATENCY.get() {
        h.with_label_values(&[method]).observe(duration_secs);
    }
}

/// Record a failed bridge request.
#[inline]
pub fn record_request_error(method: &str, error: &str) {
    if let Some(c) = REQUEST_ERRORS.get() {
        c.with_label_values(&[method, error]).inc();
    }
}

#[inline]
pub fn record_event(event: &str) {
    if let Some(c) = EVENTS_DISPATCHED.get() {
        c.with_label_values(&[event]).inc();
    }
}

#[inline]
pub fn record_token_minted() {
    if let Some(c) = TOKENS_MINTED.get() {
        c.inc();
    }
}

/// Record an AIT synthesis attempt (`"encoded"` or `"rejected"`).
#[inline]
pub fn record_ait_section(result: &str) {
    if let Some(c) = AIT_SECTIONS.get() {
        c.with_label_values(&[result]).inc();
    }
}

#[inline]
pub fn client_connected() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.inc();
    }
}

#[inline]
pub fn client_disconnected() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        init();

        record_request("Configuration.getCountryId", 0.0001);
        record_request_error("Broadcast.setChannelToNull", "authorization");
        record_ait_section("encoded");

        let output = gather_metrics();
        assert!(output.contains("orb_request_total"));
        assert!(output.contains("orb_request_errors_total"));
        assert!(output.contains("orb_ait_sections_total"));
    }
}
