use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder};

// Prometheus metrics (default registry)
pub static WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "grade_store_writes_total",
        "Total records upserted through the write listener"
    )
    .expect("register writes_total")
});

pub static DECODE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "grade_store_decode_errors_total",
        "Total write requests rejected because the body did not decode"
    )
    .expect("register decode_errors_total")
});

pub static UNAUTHORIZED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "grade_store_unauthorized_total",
        "Total write requests rejected by the authorization gate"
    )
    .expect("register unauthorized_total")
});

pub static READS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "grade_store_reads_total",
        "Total lookups served by the read listener"
    )
    .expect("register reads_total")
});

pub static READ_MISSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "grade_store_read_misses_total",
        "Total lookups for an unknown user_id"
    )
    .expect("register read_misses_total")
});

pub static RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("grade_store_records", "Records currently held in memory")
        .expect("register records")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
