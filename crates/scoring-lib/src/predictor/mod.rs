//! ML prediction pipeline

mod classifier;
mod features;
pub mod fields;
mod inference;
mod output;

pub use classifier::{
    compute_checksum, Capabilities, Classifier, LinearKind, LinearModel, RawPrediction,
};
#[cfg(test)]
pub(crate) use classifier::onnx_fixtures;
pub use features::{FeatureExtractor, PROFILE_SATURATION_CHARS, SUSPICIOUS_KEYWORDS};
pub use inference::{InferenceEngine, InferenceStats};
pub use output::{
    risk_level, risk_score, OutputFormatter, FRAUD_LABEL, HIGH_RISK_THRESHOLD,
    LOW_RISK_THRESHOLD, REAL_LABEL, RISK_SCORE_SCALE,
};
