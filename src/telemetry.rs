//! Telemetry utilities for request timing and span construction.

use std::time::Instant;

/// Guard for timing a bridge request.
///
/// Records request latency when dropped.
pub struct RequestTimer {
    method: &'static str,
    start: Instant,
}

impl RequestTimer {
    /// Start timing a request. `method` must be a catalogue name so the
    /// metric label set stays bounded.
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_request(self.method, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Span for a gateway client connection.
    pub fn connection(id: &str, addr: &str) -> Span {
        info_span!("connection", id = %id, addr = %addr)
    }

    /// Span for one bridge request.
    pub fn request(method: &str, app_id: Option<u32>) -> Span {
        match app_id {
            Some(app_id) => debug_span!("request", method = %method, app_id),
            None => debug_span!("request", method = %method),
        }
    }
}
