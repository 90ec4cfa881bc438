//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry, register_histogram_with_registry, Counter, CounterVec,
    Histogram, HistogramVec, Opts, Registry,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> =
    Lazy::new(|| Arc::new(Metrics::new().expect("Failed to initialize metrics")));

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Precedent scoring metrics
    pub scoring_requests: CounterVec,
    pub scoring_request_duration: Histogram,
    pub precedents_found: Histogram,

    // Agent pipeline metrics
    pub pipeline_requests: CounterVec,
    pub pipeline_duration: Histogram,
    pub stage_duration: HistogramVec,
    pub stage_failures: CounterVec,

    // Precedent index metrics
    pub index_searches: CounterVec,
    pub index_degraded: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let scoring_requests = register_counter_vec_with_registry!(
            Opts::new("scoring_requests_total", "Total case scoring requests"),
            &["outcome"],
            registry
        )?;

        let scoring_request_duration = register_histogram_with_registry!(
            "scoring_request_duration_seconds",
            "Case scoring request duration in seconds",
            registry
        )?;

        let precedents_found = register_histogram_with_registry!(
            "precedents_found",
            "Precedents retrieved per scoring request",
            registry
        )?;

        let pipeline_requests = register_counter_vec_with_registry!(
            Opts::new("pipeline_requests_total", "Total agent pipeline requests"),
            &["status"],
            registry
        )?;

        let pipeline_duration = register_histogram_with_registry!(
            "pipeline_duration_seconds",
            "Agent pipeline duration in seconds",
            registry
        )?;

        let stage_duration = register_histogram_vec_with_registry!(
            "stage_duration_seconds",
            "Agent stage duration in seconds",
            &["stage"],
            registry
        )?;

        let stage_failures = register_counter_vec_with_registry!(
            Opts::new("stage_failures_total", "Total agent stage failures"),
            &["stage"],
            registry
        )?;

        let index_searches = register_counter_vec_with_registry!(
            Opts::new("index_searches_total", "Total precedent index searches"),
            &["status"],
            registry
        )?;

        let index_degraded = register_counter_with_registry!(
            Opts::new(
                "index_degraded_total",
                "Scoring requests served without a configured precedent index"
            ),
            registry
        )?;

        Ok(Self {
            registry,
            scoring_requests,
            scoring_request_duration,
            precedents_found,
            pipeline_requests,
            pipeline_duration,
            stage_duration,
            stage_failures,
            index_searches,
            index_degraded,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a scoring request by outcome (cached, fresh, degraded, error)
    pub fn record_scoring(&self, outcome: &str) {
        self.scoring_requests.with_label_values(&[outcome]).inc();
    }

    /// Record a precedent index search. The result-count histogram only
    /// sees successful searches; failures would skew it toward zero.
    pub fn record_index_search(&self, success: bool, count: usize) {
        let status = if success { "success" } else { "error" };
        self.index_searches.with_label_values(&[status]).inc();
        if success {
            self.precedents_found.observe(count as f64);
        }
    }

    /// Record a completed agent stage
    pub fn record_stage(&self, stage: &str, duration_secs: f64) {
        self.stage_duration
            .with_label_values(&[stage])
            .observe(duration_secs);
    }

    /// Record an agent stage failure
    pub fn record_stage_failure(&self, stage: &str) {
        self.stage_failures.with_label_values(&[stage]).inc();
    }

    /// Record a completed pipeline run
    pub fn record_pipeline(&self, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.pipeline_requests.with_label_values(&[status]).inc();
        if success {
            self.pipeline_duration.observe(duration_secs);
        }
    }

    /// Export all metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error>> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialize() {
        let metrics = Metrics::new().unwrap();
        metrics.record_scoring("fresh");
        metrics.record_index_search(true, 7);
        metrics.record_stage("researcher", 1.2);
        metrics.record_pipeline(true, 4.5);

        let exported = metrics.export().unwrap();
        assert!(exported.contains("scoring_requests_total"));
        assert!(exported.contains("stage_duration_seconds"));
    }

    #[test]
    fn test_global_registry_is_shared() {
        METRICS.record_scoring("degraded");
        assert!(METRICS.export().unwrap().contains("scoring_requests_total"));
    }
}
