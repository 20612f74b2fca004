//! Preprocessing helper artifacts produced alongside the trained models

use crate::catalog::LOGISTIC_REGRESSION;
use crate::models::{FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Kinds of optional helper artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Scaler,
    Encoders,
    Stats,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Scaler,
        ArtifactKind::Encoders,
        ArtifactKind::Stats,
    ];

    /// File stem of the helper inside the artifact directory
    pub fn file_stem(&self) -> String {
        match self {
            ArtifactKind::Scaler => format!("{}_scaler", LOGISTIC_REGRESSION),
            ArtifactKind::Encoders => "label_encoders".to_string(),
            ArtifactKind::Stats => "feature_stats".to_string(),
        }
    }
}

/// Standardization fitted on the training set: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        let values: Vec<f64> = features
            .to_array()
            .iter()
            .enumerate()
            .map(|(i, x)| {
                let mean = self.mean.get(i).copied().unwrap_or(0.0);
                let scale = match self.scale.get(i).copied() {
                    Some(s) if s != 0.0 => s,
                    _ => 1.0,
                };
                (x - mean) / scale
            })
            .collect();
        FeatureVector::from_slice(&values)
    }
}

/// A fitted label encoder: the learned classes, code = index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Integer code of a known category, `None` for unseen values
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == value)
    }
}

/// Label encoders keyed by snake_case field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoders {
    encoders: HashMap<String, LabelEncoder>,
}

impl LabelEncoders {
    pub fn new(encoders: HashMap<String, LabelEncoder>) -> Self {
        Self { encoders }
    }

    pub fn get(&self, field: &str) -> Option<&LabelEncoder> {
        self.encoders.get(field)
    }

    /// Encode a value for a field.
    ///
    /// Fields without an encoder and values the encoder never saw both
    /// encode to 0.
    pub fn encode_or_default(&self, field: &str, value: &str) -> f64 {
        self.get(field)
            .and_then(|encoder| encoder.encode(value))
            .map(|code| code as f64)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

/// Feature statistics written by the training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureStats {
    /// Disagreements between the recorded training layout and [`FEATURE_COUNT`]
    pub fn layout_mismatches(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Some(n) = self.n_features {
            if n != FEATURE_COUNT {
                problems.push(format!(
                    "feature_stats records {} features, extractor produces {}",
                    n, FEATURE_COUNT
                ));
            }
        }
        if let Some(names) = &self.feature_names {
            if names.len() != FEATURE_COUNT {
                problems.push(format!(
                    "feature_stats lists {} feature names, extractor produces {}",
                    names.len(),
                    FEATURE_COUNT
                ));
            }
        }
        problems
    }
}

/// Helpers loaded once per process and shared read-only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactBundle {
    pub scaler: Option<StandardScaler>,
    pub encoders: Option<LabelEncoders>,
    pub stats: Option<FeatureStats>,
}

impl ArtifactBundle {
    /// Bundle with no helpers: every preprocessing step is skipped
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_encoders(mut self, encoders: LabelEncoders) -> Self {
        self.encoders = Some(encoders);
        self
    }

    /// Encode a categorical value, 0 when no encoder applies
    pub fn encode(&self, field: &str, value: &str) -> f64 {
        self.encoders
            .as_ref()
            .map(|e| e.encode_or_default(field, value))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scaler_standardizes_each_slot() {
        let scaler = StandardScaler {
            mean: vec![10.0; FEATURE_COUNT],
            scale: vec![2.0; FEATURE_COUNT],
        };
        let v = FeatureVector::from_slice(&[14.0, 10.0, 6.0]);
        let scaled = scaler.transform(&v).to_array();
        assert_eq!(scaled[0], 2.0);
        assert_eq!(scaled[1], 0.0);
        assert_eq!(scaled[2], -2.0);
        assert_eq!(scaled[3], -5.0);
    }

    #[test]
    fn test_scaler_zero_scale_and_short_arrays() {
        let scaler = StandardScaler {
            mean: vec![1.0],
            scale: vec![0.0],
        };
        let v = FeatureVector::from_slice(&[3.0, 7.0]);
        let scaled = scaler.transform(&v).to_array();
        assert_eq!(scaled[0], 2.0);
        assert_eq!(scaled[1], 7.0);
    }

    #[test]
    fn test_label_encoder_known_and_unseen() {
        let encoders: LabelEncoders = serde_json::from_value(json!({
            "employment_type": ["Contract", "Full-time", "Part-time"]
        }))
        .unwrap();
        assert_eq!(encoders.encode_or_default("employment_type", "Full-time"), 1.0);
        assert_eq!(encoders.encode_or_default("employment_type", "Gig"), 0.0);
        assert_eq!(encoders.encode_or_default("industry", "Marketing"), 0.0);
        assert_eq!(encoders.len(), 1);
    }

    #[test]
    fn test_bundle_builders() {
        let bundle = ArtifactBundle::empty();
        assert!(bundle.scaler.is_none() && bundle.encoders.is_none() && bundle.stats.is_none());
        assert_eq!(bundle.encode("industry", "Unknown"), 0.0);

        let bundle = bundle.with_scaler(StandardScaler {
            mean: vec![],
            scale: vec![],
        });
        assert!(bundle.scaler.is_some());
        assert!(bundle.encoders.is_none());
    }

    #[test]
    fn test_feature_stats_layout_check() {
        let stats: FeatureStats = serde_json::from_value(json!({
            "n_features": 13,
            "feature_names": ["a", "b"],
            "fraud_rate": 0.048
        }))
        .unwrap();
        assert_eq!(stats.layout_mismatches().len(), 2);
        assert!(stats.extra.contains_key("fraud_rate"));

        let ok: FeatureStats = serde_json::from_value(json!({"n_features": 25})).unwrap();
        assert!(ok.layout_mismatches().is_empty());
    }

    #[test]
    fn test_helper_file_stems() {
        assert_eq!(ArtifactKind::Scaler.file_stem(), "Logistic_Regression_scaler");
        assert_eq!(ArtifactKind::Encoders.file_stem(), "label_encoders");
        assert_eq!(ArtifactKind::Stats.file_stem(), "feature_stats");
    }
}
