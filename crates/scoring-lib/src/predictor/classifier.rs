//! Loaded classifier handles
//!
//! A [`Classifier`] wraps one trained model together with the capabilities
//! it was found to have at load time: whether it produces class
//! probabilities and how many input features it declares. Two backends are
//! supported:
//! - ONNX graphs exported from the training run, run with tract
//! - linear models shipped as JSON coefficients

use crate::artifacts::{ArtifactFormat, ResolvedArtifact};
use crate::error::{Result, ScoringError};
use crate::models::FEATURE_COUNT;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tract_onnx::prelude::*;
use tract_onnx::tract_hir::infer::Factoid;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// What a loaded model can do, fixed at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// The model reports a probability for the fraudulent class
    pub probability: bool,
    /// Input width declared by the model, if it declares one
    pub declared_features: Option<usize>,
}

/// Raw model output before risk shaping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    /// 0 = real, 1 = fraudulent
    pub label: u8,
    /// Probability of the fraudulent class, when the model has one
    pub positive_probability: Option<f64>,
}

/// Kind of JSON-exported linear model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearKind {
    LogisticRegression,
    LinearSvc,
}

/// Linear classifier exported as coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub kind: LinearKind,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    fn decision(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }

    fn run(&self, features: &[f64]) -> RawPrediction {
        let decision = self.decision(features);
        let label = u8::from(decision > 0.0);
        let positive_probability = match self.kind {
            LinearKind::LogisticRegression => Some(1.0 / (1.0 + (-decision).exp())),
            LinearKind::LinearSvc => None,
        };
        RawPrediction {
            label,
            positive_probability,
        }
    }
}

enum Backend {
    Onnx(TractModel),
    Linear(LinearModel),
}

/// A trained model ready for inference
pub struct Classifier {
    name: String,
    backend: Backend,
    capabilities: Capabilities,
    checksum: String,
    loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match self.backend {
            Backend::Onnx(_) => "onnx",
            Backend::Linear(_) => "linear",
        };
        f.debug_struct("Classifier")
            .field("name", &self.name)
            .field("backend", &backend)
            .field("capabilities", &self.capabilities)
            .field("checksum", &self.checksum)
            .finish()
    }
}

impl Classifier {
    /// Decode a resolved model artifact
    pub fn from_artifact(artifact: &ResolvedArtifact) -> Result<Self> {
        let checksum = compute_checksum(&artifact.bytes);
        let (backend, capabilities) = match artifact.format {
            ArtifactFormat::Onnx => {
                let (plan, capabilities) = load_onnx(&artifact.bytes)
                    .map_err(|e| ScoringError::deserialization(&artifact.name, e))?;
                (Backend::Onnx(plan), capabilities)
            }
            ArtifactFormat::Json => {
                let model: LinearModel = serde_json::from_slice(&artifact.bytes)
                    .map_err(|e| ScoringError::deserialization(&artifact.name, e))?;
                let capabilities = linear_capabilities(&model);
                (Backend::Linear(model), capabilities)
            }
        };

        Ok(Self {
            name: artifact.name.clone(),
            backend,
            capabilities,
            checksum,
            loaded_at: Utc::now(),
        })
    }

    /// Wrap an in-memory linear model
    pub fn linear(name: impl Into<String>, model: LinearModel) -> Self {
        let checksum = serde_json::to_vec(&model)
            .map(|bytes| compute_checksum(&bytes))
            .unwrap_or_default();
        Self {
            name: name.into(),
            capabilities: linear_capabilities(&model),
            backend: Backend::Linear(model),
            checksum,
            loaded_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// SHA256 of the artifact bytes the model was built from
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Whether the declared input width agrees with the extractor output
    pub fn matches_feature_layout(&self) -> bool {
        self.capabilities
            .declared_features
            .map(|n| n == FEATURE_COUNT)
            .unwrap_or(true)
    }

    /// Run the model on one feature row
    pub fn run(&self, features: &[f64]) -> Result<RawPrediction> {
        match &self.backend {
            Backend::Linear(model) => Ok(model.run(features)),
            Backend::Onnx(plan) => run_onnx(plan, features, self.capabilities.probability)
                .map_err(|e| ScoringError::Inference(e.to_string())),
        }
    }
}

fn linear_capabilities(model: &LinearModel) -> Capabilities {
    Capabilities {
        probability: model.kind == LinearKind::LogisticRegression,
        declared_features: Some(model.coefficients.len()),
    }
}

/// Parse, pin the input shape to a single row and optimize an ONNX model
fn load_onnx(bytes: &[u8]) -> TractResult<(TractModel, Capabilities)> {
    let model = tract_onnx::onnx().model_for_read(&mut std::io::Cursor::new(bytes))?;
    let declared_features = declared_feature_count(&model);
    // label first, class probabilities second when exported
    let probability = model.output_outlets()?.len() >= 2;
    let width = declared_features.unwrap_or(FEATURE_COUNT);

    let plan = model
        .with_input_fact(0, f32::fact([1, width]).into())?
        .into_optimized()?
        .into_runnable()?;

    Ok((
        plan,
        Capabilities {
            probability,
            declared_features,
        },
    ))
}

fn declared_feature_count(model: &InferenceModel) -> Option<usize> {
    let fact = model.input_fact(0).ok()?;
    let width = fact.shape.dims().last()?.concretize()?;
    width.to_i64().ok().and_then(|n| usize::try_from(n).ok())
}

fn run_onnx(
    plan: &TractModel,
    features: &[f64],
    with_probability: bool,
) -> TractResult<RawPrediction> {
    let row: Vec<f32> = features.iter().map(|x| *x as f32).collect();
    let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, row.len()), row)?.into();
    let outputs = plan.run(tvec!(input.into()))?;

    let label_tensor = outputs
        .first()
        .ok_or_else(|| anyhow::anyhow!("model produced no outputs"))?;
    let label = first_value(label_tensor)
        .map(|v| u8::from(v.round() as i64 == 1))
        .ok_or_else(|| anyhow::anyhow!("model label output is empty or not numeric"))?;

    let positive_probability = if with_probability {
        let probabilities = outputs
            .get(1)
            .ok_or_else(|| anyhow::anyhow!("model probability output missing"))?
            .to_array_view::<f32>()?
            .iter()
            .map(|p| *p as f64)
            .collect::<Vec<_>>();
        match probabilities.as_slice() {
            [_, positive, ..] => Some(*positive),
            [only] => Some(*only),
            [] => None,
        }
    } else {
        None
    };

    Ok(RawPrediction {
        label,
        positive_probability,
    })
}

fn first_value(tensor: &Tensor) -> Option<f64> {
    if let Ok(view) = tensor.to_array_view::<i64>() {
        return view.iter().next().map(|v| *v as f64);
    }
    if let Ok(view) = tensor.to_array_view::<f32>() {
        return view.iter().next().map(|v| *v as f64);
    }
    None
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
