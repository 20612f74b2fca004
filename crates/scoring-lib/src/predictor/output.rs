//! Prediction output formatting
//!
//! Turns a class label and fraud probability into the human-facing risk
//! report: rounded probability, percentage string, 0-7 risk score and a
//! three-tier risk level.

use crate::models::{PredictionResult, RiskLevel};

/// Probability below which a posting is low risk
pub const LOW_RISK_THRESHOLD: f64 = 0.3;

/// Probability at or above which a posting is high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Risk score is floor(probability * RISK_SCORE_SCALE)
pub const RISK_SCORE_SCALE: f64 = 7.0;

pub const FRAUD_LABEL: &str = "虚假职位";
pub const REAL_LABEL: &str = "真实职位";

/// Three-tier risk level for a fraud probability
pub fn risk_level(probability: f64) -> RiskLevel {
    if probability < LOW_RISK_THRESHOLD {
        RiskLevel::Low
    } else if probability < HIGH_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Integer risk score in [0, 7]
pub fn risk_score(probability: f64) -> u8 {
    (probability.clamp(0.0, 1.0) * RISK_SCORE_SCALE).floor() as u8
}

/// Formats raw model outputs into a PredictionResult
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Build the report. `probability` is clamped to [0, 1] first.
    pub fn format(&self, model_name: &str, label: u8, probability: f64) -> PredictionResult {
        let probability = probability.clamp(0.0, 1.0);
        let prediction = u8::from(label == 1);

        PredictionResult {
            success: true,
            model_name: model_name.to_string(),
            prediction,
            prediction_label: if prediction == 1 { FRAUD_LABEL } else { REAL_LABEL }.to_string(),
            probability: round4(probability),
            probability_percent: format!("{:.2}%", probability * 100.0),
            risk_score: risk_score(probability),
            risk_level: risk_level(probability),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
