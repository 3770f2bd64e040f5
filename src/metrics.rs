//! Prometheus metrics for token issuance and verification.

use crate::error::ErrorCode;
use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder};
use std::time::Duration;

static OPERATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_operations_total",
        "Total session token operations",
        &["operation", "outcome"]
    )
    .expect("Failed to register session_token_operations metric")
});

static LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "session_token_latency_seconds",
        "Session token operation latency",
        &["operation"],
        vec![0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1]
    )
    .expect("Failed to register session_token_latency metric")
});

static SECRET_MATCHES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_secret_matches_total",
        "Decryption secret selected, by rotation position",
        &["position"]
    )
    .expect("Failed to register session_token_secret_matches metric")
});

/// Metrics collector for encode/decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionMetrics;

impl SessionMetrics {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Lazy::force(&OPERATIONS);
        Lazy::force(&LATENCY);
        Lazy::force(&SECRET_MATCHES);
        Self
    }

    /// Record an operation; `failure` is the error code if it failed.
    pub fn record_operation(&self, operation: &str, failure: Option<ErrorCode>, latency: Duration) {
        let outcome = failure.map_or("success", |code| code.as_str());
        OPERATIONS.with_label_values(&[operation, outcome]).inc();
        LATENCY
            .with_label_values(&[operation])
            .observe(latency.as_secs_f64());
    }

    /// Record which rotation position supplied the decryption key.
    pub fn record_secret_match(&self, index: usize) {
        let position = if index == 0 { "current" } else { "legacy" };
        SECRET_MATCHES.with_label_values(&[position]).inc();
    }

    /// Operation count for a label pair.
    #[must_use]
    pub fn operation_count(&self, operation: &str, outcome: &str) -> f64 {
        OPERATIONS.with_label_values(&[operation, outcome]).get()
    }

    /// Secret match count for `current` or `legacy`.
    #[must_use]
    pub fn secret_match_count(&self, position: &str) -> f64 {
        SECRET_MATCHES.with_label_values(&[position]).get()
    }

    /// Text exposition of the default registry.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .is_err()
        {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation() {
        let metrics = SessionMetrics::new();
        let before = metrics.operation_count("metrics_test", "TOKEN_EXPIRED");
        metrics.record_operation(
            "metrics_test",
            Some(ErrorCode::TokenExpired),
            Duration::from_micros(40),
        );
        assert_eq!(metrics.operation_count("metrics_test", "TOKEN_EXPIRED"), before + 1.0);
    }

    #[test]
    fn test_secret_positions() {
        let metrics = SessionMetrics::new();
        let legacy = metrics.secret_match_count("legacy");
        metrics.record_secret_match(2);
        assert!(metrics.secret_match_count("legacy") >= legacy + 1.0);
    }

    #[test]
    fn test_render_contains_metric_names() {
        let metrics = SessionMetrics::new();
        metrics.record_operation("render_test", None, Duration::from_millis(1));
        assert!(metrics.render().contains("session_token_operations_total"));
    }
}
