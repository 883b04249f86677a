//! Metrics collection and monitoring for Toy House
//!
//! Prometheus collectors registered on a crate-owned registry, so the
//! `/metrics` endpoint only exposes what this service records.

use crate::core::error::Result;
use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Instant;

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Request and store-call metrics
pub struct Metrics {
    /// Handled requests by operation and outcome
    pub requests: IntCounterVec,
    /// Store round-trip latency by operation
    pub store_duration: HistogramVec,
}

impl Metrics {
    /// Create the collectors and register them on `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests = IntCounterVec::new(
            Opts::new("toy_house_requests_total", "Total number of handled requests"),
            &["operation", "outcome"],
        )?;
        let store_duration = HistogramVec::new(
            HistogramOpts::new(
                "toy_house_store_duration_seconds",
                "Duration of store calls in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(store_duration.clone()))?;

        Ok(Self {
            requests,
            store_duration,
        })
    }

    /// Get the global metrics instance
    pub fn global() -> &'static Metrics {
        static INSTANCE: Lazy<Metrics> = Lazy::new(|| {
            Metrics::new(&REGISTRY).expect("metric names are unique on a fresh registry")
        });
        &INSTANCE
    }

    /// Start timing a store call
    pub fn store_timer(&self, operation: &str) -> Timer {
        Timer::start(self.store_duration.with_label_values(&[operation]))
    }

    /// Count one handled request
    pub fn record_request(&self, operation: &str, outcome: &str) {
        self.requests.with_label_values(&[operation, outcome]).inc();
    }
}

/// Timer for measuring operation duration with automatic histogram recording
pub struct Timer {
    start: Instant,
    histogram: Histogram,
}

impl Timer {
    /// Start a new timer
    pub fn start(histogram: Histogram) -> Self {
        Self {
            start: Instant::now(),
            histogram,
        }
    }

    /// Record the elapsed time and consume the timer
    pub fn finish(self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Initialize the metrics registry by creating the global metrics instance
pub fn init_registry() {
    let _ = Metrics::global();
}

/// Collect and return all metrics as a Prometheus-formatted string
pub fn collect_metrics() -> String {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_registry_records() {
        let registry = Registry::new();
        let metrics = Metrics::new(&registry).unwrap();

        metrics.record_request("get_toy", "ok");
        metrics.record_request("get_toy", "ok");
        metrics.record_request("get_toy", "not_found");
        metrics.store_timer("find_one").finish();

        assert_eq!(metrics.requests.with_label_values(&["get_toy", "ok"]).get(), 2);
        assert_eq!(metrics.requests.with_label_values(&["get_toy", "not_found"]).get(), 1);
        assert_eq!(
            metrics.store_duration.with_label_values(&["find_one"]).get_sample_count(),
            1
        );
    }

    #[test]
    fn test_duplicate_registration_is_an_error() {
        let registry = Registry::new();
        let _first = Metrics::new(&registry).unwrap();
        assert!(Metrics::new(&registry).is_err());
    }

    #[test]
    fn test_global_metrics_are_exported() {
        Metrics::global().record_request("list_all", "ok");
        let text = collect_metrics();
        assert!(text.contains("toy_house_requests_total"));
    }
}
