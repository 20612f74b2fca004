//! Error taxonomy for artifact loading and scoring
//!
//! Extraction problems never show up here: missing or oddly named fields
//! and unseen category values are recovered inside the feature extractor.

use thiserror::Error;

/// Errors surfaced by the scoring pipeline
#[derive(Debug, Error)]
pub enum ScoringError {
    /// A model or helper artifact is missing from the artifact directory
    #[error("模型不存在: {name}")]
    ArtifactNotFound { name: String },

    /// The artifact exists but its contents cannot be decoded
    #[error("无法加载 {artifact}，可能是版本不兼容: {reason}")]
    Deserialization { artifact: String, reason: String },

    /// The feature vector length disagrees with what the model declares
    #[error("特征数量不匹配: 提供了 {provided} 个特征，但模型期望 {expected} 个特征")]
    FeatureMismatch { provided: usize, expected: usize },

    /// The request payload or a requested name is unusable
    #[error("{0}")]
    MalformedInput(String),

    /// The model failed while running
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoringError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ArtifactNotFound { name: name.into() }
    }

    pub fn deserialization(artifact: impl Into<String>, reason: impl ToString) -> Self {
        Self::Deserialization {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::ArtifactNotFound { .. } => "artifact_not_found",
            ScoringError::Deserialization { .. } => "deserialization_error",
            ScoringError::FeatureMismatch { .. } => "feature_mismatch",
            ScoringError::MalformedInput(_) => "malformed_input",
            ScoringError::Inference(_) => "inference_error",
            ScoringError::Io(_) => "io_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;
