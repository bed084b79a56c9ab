//! Prometheus metrics for the invoices dashboard.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Mutation outcomes by operation (create, update, delete) and outcome
/// (success, invalid, db_error).
pub static MUTATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dashboard_invoice_mutations_total",
        "Total number of invoice mutations by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("Failed to register invoice_mutations_total")
});

/// Rendered page cache events (hit, miss, invalidated, stale, rejected).
pub static PAGE_CACHE_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dashboard_page_cache_events_total",
        "Total number of page cache events by type",
        &["event"]
    )
    .expect("Failed to register page_cache_events_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "dashboard_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&MUTATIONS_TOTAL);
    Lazy::force(&PAGE_CACHE_EVENTS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUESTS_TOTAL);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUEST_DURATION_SECONDS);
}

pub fn record_mutation(operation: &str, outcome: &str) {
    MUTATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn record_cache_event(event: &str) {
    PAGE_CACHE_EVENTS_TOTAL.with_label_values(&[event]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
