//! Prometheus metrics for monitoring API performance and health.

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus exporter and return the render handle for the
/// `/metrics` endpoint.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ],
    )?;

    Ok(builder.install_recorder()?)
}

/// Middleware recording request count and duration per method/path/status.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    // Replace ids with placeholders to keep label cardinality bounded
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

/// Record the outcome of one assignment fan-out batch.
pub fn record_assignment_batch(created: u64, skipped: u64) {
    counter!("drill_assignments_created_total").increment(created);
    counter!("drill_assignments_skipped_total").increment(skipped);
}

/// Record one confidence recomputation.
pub fn record_confidence_recompute(trigger: &str) {
    counter!(
        "confidence_recomputations_total",
        "trigger" => trigger.to_string()
    )
    .increment(1);
}

/// Normalize URL paths to reduce cardinality in metrics
fn normalize_path(path: &str) -> String {
    let uuid_regex =
        regex::Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap();

    uuid_regex.replace_all(path, ":id").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/drills/550e8400-e29b-41d4-a716-446655440000"),
            "/drills/:id"
        );
        assert_eq!(normalize_path("/drills"), "/drills");
        assert_eq!(normalize_path("/health"), "/health");
    }
}
