//! Observability infrastructure for the scoring service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction and load counts, current model)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_gauge, GaugeVec, Histogram, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ScoringMetricsInner> = OnceLock::new();

struct ScoringMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntGauge,
    prediction_errors_total: IntGauge,
    model_loads_total: IntGauge,
    models_loaded: IntGauge,
    current_model_info: GaugeVec,
}

impl ScoringMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "jobguard_prediction_latency_seconds",
                "Time spent extracting features and scoring a posting",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_gauge!(
                "jobguard_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_gauge!(
                "jobguard_prediction_errors_total",
                "Total number of failed prediction requests"
            )
            .expect("Failed to register prediction_errors_total"),

            model_loads_total: register_int_gauge!(
                "jobguard_model_loads_total",
                "Total number of model artifacts decoded from disk"
            )
            .expect("Failed to register model_loads_total"),

            models_loaded: register_int_gauge!(
                "jobguard_models_loaded",
                "Number of models held in the model cache"
            )
            .expect("Failed to register models_loaded"),

            current_model_info: register_gauge_vec!(
                "jobguard_current_model_info",
                "The model currently used when a request names none",
                &["model"]
            )
            .expect("Failed to register current_model_info"),
        }
    }
}

/// Scoring metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance. Clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct ScoringMetrics {
    _private: (),
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScoringMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringMetrics").finish()
    }
}

impl ScoringMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ScoringMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ScoringMetricsInner {
        GLOBAL_METRICS.get_or_init(ScoringMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn inc_model_loads(&self) {
        self.inner().model_loads_total.inc();
    }

    pub fn set_models_loaded(&self, count: usize) {
        self.inner().models_loaded.set(count as i64);
    }

    /// Replace the current model label
    pub fn set_current_model(&self, model: &str) {
        self.inner().current_model_info.reset();
        self.inner()
            .current_model_info
            .with_label_values(&[model])
            .set(1.0);
    }
}

/// Structured logger for scoring events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_dir: &str, default_model: &str) {
        info!(
            event = "service_started",
            service = %self.service_name,
            version = %version,
            model_dir = %model_dir,
            default_model = %default_model,
            "Scoring service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Scoring service shutting down"
        );
    }

    pub fn log_model_loaded(&self, model: &str, checksum: &str, elapsed_ms: u128) {
        info!(
            event = "model_loaded",
            service = %self.service_name,
            model = %model,
            checksum = %checksum,
            elapsed_ms = elapsed_ms,
            "Model loaded into cache"
        );
    }

    pub fn log_model_load_failed(&self, model: &str, kind: &str, error: &str) {
        warn!(
            event = "model_load_failed",
            service = %self.service_name,
            model = %model,
            error_kind = %kind,
            error = %error,
            "Model load failed, cache left unchanged"
        );
    }

    pub fn log_model_switched(&self, previous: &str, current: &str) {
        info!(
            event = "model_switched",
            service = %self.service_name,
            previous_model = %previous,
            current_model = %current,
            "Default model switched"
        );
    }

    pub fn log_prediction(
        &self,
        model: &str,
        prediction: u8,
        probability: f64,
        risk_score: u8,
        risk_level: &str,
    ) {
        info!(
            event = "prediction_generated",
            service = %self.service_name,
            model = %model,
            prediction = prediction,
            probability = probability,
            risk_score = risk_score,
            risk_level = %risk_level,
            "Generated fraud prediction"
        );
    }

    pub fn log_prediction_failed(&self, model: &str, kind: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service_name,
            model = %model,
            error_kind = %kind,
            error = %error,
            "Prediction failed"
        );
    }
}
