//! Core data models for the scoring service

use crate::error::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of slots in the model input vector
pub const FEATURE_COUNT: usize = 25;

/// Version of the feature layout below. Bump it whenever slots are added,
/// removed or reordered, and retrain the models against the new layout.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Request key carrying the optional model override
pub const MODEL_NAME_KEY: &str = "modelName";

/// A loosely structured job posting as submitted by callers
///
/// Field names are not normalized here; lookups go through the alias table
/// in [`crate::predictor::fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPosting {
    fields: Map<String, Value>,
}

impl JobPosting {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Accept any JSON object; everything else is malformed input
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ScoringError::MalformedInput(format!(
                "job posting must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Parse a posting from raw JSON text
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ScoringError::MalformedInput(format!("invalid JSON payload: {}", e)))?;
        Self::from_value(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remove the model override from the payload.
    ///
    /// Blank or non-string values count as "no override".
    pub fn take_model_name(&mut self) -> Option<String> {
        match self.fields.remove(MODEL_NAME_KEY) {
            Some(Value::String(name)) if !name.trim().is_empty() => Some(name.trim().to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for JobPosting {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Feature vector for ML inference, one named slot per model input position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub title_length: f64,
    pub description_length: f64,
    pub requirements_length: f64,
    pub company_profile_length: f64,
    pub telecommuting: f64,
    pub has_company_logo: f64,
    pub has_questions: f64,
    pub has_salary_range: f64,
    pub employment_type_code: f64,
    pub required_experience_code: f64,
    pub required_education_code: f64,
    pub industry_code: f64,
    pub function_code: f64,
    pub title_words: f64,
    pub description_words: f64,
    pub requirements_words: f64,
    pub company_profile_words: f64,
    pub has_department: f64,
    pub benefits_length: f64,
    pub has_benefits: f64,
    pub suspicious_keyword_hits: f64,
    pub location_length: f64,
    pub description_title_ratio: f64,
    pub requirements_description_ratio: f64,
    pub company_profile_score: f64,
}

impl FeatureVector {
    /// Values in model input order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.title_length,
            self.description_length,
            self.requirements_length,
            self.company_profile_length,
            self.telecommuting,
            self.has_company_logo,
            self.has_questions,
            self.has_salary_range,
            self.employment_type_code,
            self.required_experience_code,
            self.required_education_code,
            self.industry_code,
            self.function_code,
            self.title_words,
            self.description_words,
            self.requirements_words,
            self.company_profile_words,
            self.has_department,
            self.benefits_length,
            self.has_benefits,
            self.suspicious_keyword_hits,
            self.location_length,
            self.description_title_ratio,
            self.requirements_description_ratio,
            self.company_profile_score,
        ]
    }

    /// Build a vector from raw values in model input order.
    ///
    /// Short input is zero-padded and long input is truncated to
    /// [`FEATURE_COUNT`].
    pub fn from_slice(values: &[f64]) -> Self {
        let mut v = [0.0; FEATURE_COUNT];
        for (slot, value) in v.iter_mut().zip(values) {
            *slot = *value;
        }
        Self {
            title_length: v[0],
            description_length: v[1],
            requirements_length: v[2],
            company_profile_length: v[3],
            telecommuting: v[4],
            has_company_logo: v[5],
            has_questions: v[6],
            has_salary_range: v[7],
            employment_type_code: v[8],
            required_experience_code: v[9],
            required_education_code: v[10],
            industry_code: v[11],
            function_code: v[12],
            title_words: v[13],
            description_words: v[14],
            requirements_words: v[15],
            company_profile_words: v[16],
            has_department: v[17],
            benefits_length: v[18],
            has_benefits: v[19],
            suspicious_keyword_hits: v[20],
            location_length: v[21],
            description_title_ratio: v[22],
            requirements_description_ratio: v[23],
            company_profile_score: v[24],
        }
    }

    pub const fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Three-tier fraud risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "低风险")]
    Low,
    #[serde(rename = "中风险")]
    Medium,
    #[serde(rename = "高风险")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "低风险",
            RiskLevel::Medium => "中风险",
            RiskLevel::High => "高风险",
        }
    }
}

/// Successful scoring result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub success: bool,
    pub model_name: String,
    /// 0 = real posting, 1 = fraudulent
    pub prediction: u8,
    pub prediction_label: String,
    /// Fraud probability in [0, 1], rounded to 4 decimals
    pub probability: f64,
    pub probability_percent: String,
    /// floor(probability * 7), in [0, 7]
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

/// Structured failure body shared by the HTTP and command-line surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl From<&ScoringError> for ErrorResponse {
    fn from(err: &ScoringError) -> Self {
        Self::new(err.to_string())
    }
}

/// Either a prediction or the error that replaced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreOutcome {
    Scored(PredictionResult),
    Failed(ErrorResponse),
}

impl ScoreOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScoreOutcome::Scored(_))
    }
}

impl From<Result<PredictionResult>> for ScoreOutcome {
    fn from(result: Result<PredictionResult>) -> Self {
        match result {
            Ok(prediction) => ScoreOutcome::Scored(prediction),
            Err(e) => ScoreOutcome::Failed(ErrorResponse::from(&e)),
        }
    }
}
