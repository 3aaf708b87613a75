use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all dashboard metrics
const PREFIX: &str = "royalty_dashboard";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["method", "endpoint"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Ingestion Metrics
    pub static ref ROYALTY_UPLOADS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_royalty_uploads_total"), "Royalty uploads by outcome"),
        &["platform", "outcome"]
    ).expect("Failed to create royalty_uploads_total metric");

    pub static ref ROYALTY_ROWS_INGESTED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_royalty_rows_ingested_total"), "Royalty rows persisted"),
        &["platform"]
    ).expect("Failed to create royalty_rows_ingested_total metric");

    pub static ref ROYALTY_ROWS_FAILED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_royalty_rows_failed_total"), "Royalty rows rejected"),
        &["platform"]
    ).expect("Failed to create royalty_rows_failed_total metric");

    pub static ref ROYALTY_UPLOAD_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_royalty_upload_duration_seconds"),
            "Time spent ingesting a royalty upload"
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["platform"]
    ).expect("Failed to create royalty_upload_duration_seconds metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total errors by type and endpoint"),
        &["error_type", "endpoint"]
    ).expect("Failed to create errors_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Registering twice fails; tests call this repeatedly
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ROYALTY_UPLOADS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ROYALTY_ROWS_INGESTED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ROYALTY_ROWS_FAILED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ROYALTY_UPLOAD_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Collapses a request path into a low-cardinality endpoint label.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "home",
        p if p.starts_with("/v1/royalty/") => "royalty",
        p if p.starts_with("/v1/analytics/") => "analytics",
        p if p.starts_with("/v1/subscriptions/") => "subscriptions",
        p if p.starts_with("/v1/support/") => "support",
        _ => "other",
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let endpoint = categorize_endpoint(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

/// Record a finished upload. `outcome` is one of `success`, `partial`,
/// `rejected` or `error`.
pub fn record_royalty_upload(
    platform: &str,
    outcome: &str,
    processed: usize,
    failed: usize,
    duration: Duration,
) {
    ROYALTY_UPLOADS_TOTAL
        .with_label_values(&[platform, outcome])
        .inc();
    ROYALTY_ROWS_INGESTED_TOTAL
        .with_label_values(&[platform])
        .inc_by(processed as f64);
    ROYALTY_ROWS_FAILED_TOTAL
        .with_label_values(&[platform])
        .inc_by(failed as f64);
    ROYALTY_UPLOAD_DURATION_SECONDS
        .with_label_values(&[platform])
        .observe(duration.as_secs_f64());
}

/// Record an error
pub fn record_error(error_type: &str, endpoint: &str) {
    ERRORS_TOTAL
        .with_label_values(&[error_type, endpoint])
        .inc();
}

pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<f64>().ok());
            if let Some(kb) = rss_kb {
                PROCESS_MEMORY_BYTES.set(kb * 1024.0);
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
