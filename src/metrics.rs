// Prometheus metrics definitions for the strategy backend.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("strategy_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    /// Per-team Statbotics fetches, by outcome (ok, error).
    pub static ref TEAM_FETCHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("strategy_team_fetches_total", "Per-team stats fetches"),
        &["outcome"],
    )
    .unwrap();

    /// Strategies generated, by variant (heuristic, generative).
    pub static ref STRATEGIES_GENERATED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("strategy_generated_total", "Strategies generated"),
        &["variant"],
    )
    .unwrap();

    /// Generative replies that could not be parsed into a recommendation.
    pub static ref GENERATION_FAILURES_TOTAL: IntCounter = IntCounter::new(
        "strategy_generation_failures_total",
        "Strategy generations that failed or were unparseable",
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "strategy_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(API_REQUESTS_TOTAL.clone()),
        Box::new(TEAM_FETCHES_TOTAL.clone()),
        Box::new(STRATEGIES_GENERATED_TOTAL.clone()),
        Box::new(GENERATION_FAILURES_TOTAL.clone()),
        Box::new(API_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        REGISTRY.register(c).expect("failed to register metric");
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap_or_default();
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_metrics_returns_string() {
        // Register and gather -- should not panic
        register_metrics();
        let output = gather_metrics();
        assert!(output.is_empty() || output.contains("strategy_"));
    }

    #[test]
    fn test_metric_increments() {
        API_REQUESTS_TOTAL
            .with_label_values(&["POST", "/api/analyze-strategy", "200"])
            .inc();
        TEAM_FETCHES_TOTAL.with_label_values(&["ok"]).inc();
        TEAM_FETCHES_TOTAL.with_label_values(&["error"]).inc();
        STRATEGIES_GENERATED_TOTAL
            .with_label_values(&["heuristic"])
            .inc();
        GENERATION_FAILURES_TOTAL.inc();
        API_REQUEST_DURATION_SECONDS
            .with_label_values(&["/api/analyze-strategy"])
            .observe(0.05);

        assert!(TEAM_FETCHES_TOTAL.with_label_values(&["ok"]).get() >= 1);
    }
}
