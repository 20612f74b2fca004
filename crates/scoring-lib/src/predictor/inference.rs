//! Inference engine
//!
//! Applies model-specific preprocessing, runs a loaded classifier on a
//! feature vector and shapes the result into a risk report.

use super::classifier::Classifier;
use super::output::OutputFormatter;
use crate::artifacts::ArtifactBundle;
use crate::catalog;
use crate::error::{Result, ScoringError};
use crate::models::{FeatureVector, PredictionResult, ScoreOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 50;

/// Scores feature vectors with loaded classifiers
#[derive(Debug, Default)]
pub struct InferenceEngine {
    output_formatter: OutputFormatter,
    inference_count: AtomicU64,
    slow_inference_count: AtomicU64,
}

impl InferenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a vector, reporting failures to the caller
    pub fn try_score(
        &self,
        features: &FeatureVector,
        classifier: &Classifier,
        artifacts: &ArtifactBundle,
        model_name: &str,
    ) -> Result<PredictionResult> {
        let capabilities = classifier.capabilities();
        if let Some(expected) = capabilities.declared_features {
            if expected != features.len() {
                return Err(ScoringError::FeatureMismatch {
                    provided: features.len(),
                    expected,
                });
            }
        }

        let input = match (&artifacts.scaler, catalog::requires_scaling(model_name)) {
            (Some(scaler), true) => scaler.transform(features),
            _ => *features,
        };

        let start = Instant::now();
        let raw = classifier.run(&input.to_array())?;
        let elapsed = start.elapsed();
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        if elapsed.as_millis() > MAX_INFERENCE_MS {
            self.slow_inference_count.fetch_add(1, Ordering::Relaxed);
            warn!(
                model = %model_name,
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        } else {
            debug!(model = %model_name, elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        let probability = if capabilities.probability {
            raw.positive_probability.ok_or_else(|| {
                ScoringError::Inference("model returned no class probabilities".to_string())
            })?
        } else {
            f64::from(raw.label)
        };

        if !probability.is_finite() {
            return Err(ScoringError::Inference(format!(
                "model returned non-finite probability {}",
                probability
            )));
        }

        Ok(self.output_formatter.format(model_name, raw.label, probability))
    }

    /// Score a vector; failures become an error outcome instead of escaping
    pub fn score(
        &self,
        features: &FeatureVector,
        classifier: &Classifier,
        artifacts: &ArtifactBundle,
        model_name: &str,
    ) -> ScoreOutcome {
        self.try_score(features, classifier, artifacts, model_name).into()
    }

    /// Get inference statistics
    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.inference_count.load(Ordering::Relaxed),
            slow_inferences: self.slow_inference_count.load(Ordering::Relaxed),
        }
    }
}

/// Inference statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub slow_inferences: u64,
}
