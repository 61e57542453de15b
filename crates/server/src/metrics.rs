// crates/server/src/metrics.rs
//! Application metrics for Prometheus monitoring.
//!
//! Request counters and latency per endpoint, plus upload size and the size
//! of the currently loaded export.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup, before any metrics are recorded.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    let mut installed = false;
    PROMETHEUS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if metrics::set_global_recorder(recorder).is_err() {
            tracing::warn!("Failed to set global metrics recorder (already set)");
        } else {
            describe_metrics();
            installed = true;
        }
        handle
    });

    if installed {
        tracing::info!("Prometheus metrics initialized");
    }
    installed
}

fn describe_metrics() {
    describe_counter!(
        "chat_analytics_requests_total",
        "Total number of API requests by endpoint and status"
    );
    describe_histogram!(
        "chat_analytics_request_duration_seconds",
        "Duration of API requests in seconds"
    );
    describe_histogram!(
        "chat_analytics_upload_bytes",
        "Size of uploaded exports in bytes"
    );
    describe_gauge!(
        "chat_analytics_conversations_loaded",
        "Conversations in the currently loaded export"
    );
    describe_gauge!(
        "chat_analytics_messages_loaded",
        "Countable messages in the currently loaded export"
    );
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

pub fn record_request(endpoint: &str, status: &str, duration: std::time::Duration) {
    counter!("chat_analytics_requests_total", "endpoint" => endpoint.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("chat_analytics_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_upload_size(bytes: usize) {
    histogram!("chat_analytics_upload_bytes").record(bytes as f64);
}

/// Set the loaded-export gauges. Pass zeros when the report is cleared.
pub fn record_loaded(conversations: i64, messages: i64) {
    gauge!("chat_analytics_conversations_loaded").set(conversations as f64);
    gauge!("chat_analytics_messages_loaded").set(messages as f64);
}

/// Helper for timing request handlers.
///
/// ```ignore
/// let timer = RequestTimer::new("stats");
/// // ... do work ...
/// timer.finish_ok(); // or timer.finish_err(status_code)
/// ```
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
        }
    }

    pub fn finish_ok(self) {
        record_request(self.endpoint, "200", self.start.elapsed());
    }

    pub fn finish_err(self, status: u16) {
        record_request(self.endpoint, &status.to_string(), self.start.elapsed());
    }

    /// Finish with the outcome of a handler result.
    pub fn finish_result<T>(self, result: &crate::error::ApiResult<T>) {
        match result {
            Ok(_) => self.finish_ok(),
            Err(e) => self.finish_err(e.status_code().as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::new("test_endpoint");
        std::thread::sleep(std::time::Duration::from_millis(1));
        timer.finish_ok();
    }

    #[test]
    fn test_init_metrics_renders_recorded_values() {
        init_metrics();
        record_upload_size(1024);
        record_loaded(3, 12);
        let output = render_metrics().expect("metrics initialized");
        assert!(output.contains("chat_analytics_conversations_loaded"));
    }
}
