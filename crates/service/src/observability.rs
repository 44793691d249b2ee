use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "opensds_broker_operations_total",
        "Broker operations handled, by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("register operations_total")
});

pub static BACKEND_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "opensds_broker_backend_failures_total",
        "Backend calls that failed, by operation and error kind",
        &["operation", "kind"]
    )
    .expect("register backend_failures_total")
});

pub static BACKEND_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "opensds_broker_backend_call_duration_seconds",
        "Backend call duration in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("register backend_call_duration")
});

pub fn record_operation(operation: &str, ok: bool) {
    let outcome = if ok { "success" } else { "error" };
    OPERATIONS_TOTAL.with_label_values(&[operation, outcome]).inc();
}

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
