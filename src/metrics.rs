use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};
use std::time::Instant;

use crate::{MockError, Result};

lazy_static! {
    pub static ref SERVICE_UP: IntGauge = register_int_gauge!(
        "service_up",
        "Whether the mock is up (1) or down (0)"
    ).unwrap();

    // Request metrics
    pub static ref REQUEST_COUNTER: IntCounter = register_int_counter!(
        "requests_total",
        "Total number of requests received"
    ).unwrap();

    pub static ref REQUEST_DURATION: Histogram = register_histogram!(
        "request_duration_seconds",
        "Request duration in seconds",
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).unwrap();

    // Query handling
    pub static ref QUERY_INTENTS: IntCounterVec = register_int_counter_vec!(
        "query_intent_total",
        "Classified query_range requests by intent",
        &["intent"]
    ).unwrap();

    pub static ref ORG_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "org_cache_events_total",
        "Organization result cache hits and misses",
        &["outcome"]
    ).unwrap();

    pub static ref SYNTHESIZED_SERIES: IntCounter = register_int_counter!(
        "synthesized_series_total",
        "Total number of synthetic time series generated"
    ).unwrap();

    // Directory lookups
    pub static ref LOOKUP_FAILURES: IntCounterVec = register_int_counter_vec!(
        "directory_lookup_failures_total",
        "Directory lookups that failed or timed out",
        &["operation"]
    ).unwrap();
}

pub fn init_metrics() {
    SERVICE_UP.set(1);
}

/// Counts a request on creation and observes its duration on drop.
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    pub fn new() -> Self {
        REQUEST_COUNTER.inc();
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for RequestTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        REQUEST_DURATION.observe(self.elapsed_secs());
    }
}

pub fn record_intent(intent: &str) {
    QUERY_INTENTS.with_label_values(&[intent]).inc();
}

pub fn record_cache_hit() {
    ORG_CACHE_EVENTS.with_label_values(&["hit"]).inc();
}

pub fn record_cache_miss() {
    ORG_CACHE_EVENTS.with_label_values(&["miss"]).inc();
}

pub fn record_synthesized(count: usize) {
    SYNTHESIZED_SERIES.inc_by(count as u64);
}

pub fn record_lookup_failure(operation: &str) {
    LOOKUP_FAILURES.with_label_values(&[operation]).inc();
}

/// Renders every registered metric in the Prometheus text format.
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| MockError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| MockError::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}
