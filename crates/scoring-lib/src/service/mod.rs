//! Scoring service
//!
//! Owns the artifact bundle, the model cache and the current default model.
//! The HTTP server and the command-line tool both drive scoring through this
//! type.

use crate::artifacts::{ArtifactBundle, ArtifactStore};
use crate::cache::ModelCache;
use crate::catalog::{ModelInfo, CATALOG};
use crate::error::{Result, ScoringError};
use crate::models::{JobPosting, PredictionResult, FEATURE_COUNT, FEATURE_SCHEMA_VERSION};
use crate::observability::{ScoringMetrics, StructuredLogger};
use crate::predictor::{Classifier, FeatureExtractor, InferenceEngine, InferenceStats};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, warn};


pub const EMPTY_BODY_MESSAGE: &str = "请求体为空";
pub const MISSING_MODEL_NAME_MESSAGE: &str = "缺少模型名称";

/// Health report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// At least one model is in the cache
    pub model_loaded: bool,
    pub current_model: String,
}

/// Successful model switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchResponse {
    pub success: bool,
    pub message: String,
}

/// Listing of known and available models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelListing {
    pub success: bool,
    pub current_model: String,
    pub feature_schema_version: u32,
    pub models: Vec<ModelInfo>,
}

pub struct ScoringService {
    store: ArtifactStore,
    artifacts: Arc<ArtifactBundle>,
    cache: ModelCache,
    current_model: RwLock<String>,
    extractor: FeatureExtractor,
    engine: InferenceEngine,
    metrics: ScoringMetrics,
    logger: StructuredLogger,
}

impl ScoringService {
    /// Build a service over `store`, loading its preprocessing artifacts
    pub fn new(store: ArtifactStore, default_model: impl Into<String>) -> Self {
        let artifacts = Arc::new(store.load_bundle());
        Self::with_artifacts(store, artifacts, default_model)
    }

    pub fn with_artifacts(
        store: ArtifactStore,
        artifacts: Arc<ArtifactBundle>,
        default_model: impl Into<String>,
    ) -> Self {
        let default_model = default_model.into();
        let metrics = ScoringMetrics::new();
        metrics.set_current_model(&default_model);

        Self {
            store,
            artifacts,
            cache: ModelCache::new(),
            current_model: RwLock::new(default_model),
            extractor: FeatureExtractor::new(),
            engine: InferenceEngine::new(),
            metrics,
            logger: StructuredLogger::new("jobguard"),
        }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Inference counters since the service started
    pub fn inference_stats(&self) -> InferenceStats {
        self.engine.stats()
    }

    pub async fn current_model(&self) -> String {
        self.current_model.read().await.clone()
    }

    pub async fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            model_loaded: !self.cache.is_empty(),
            current_model: self.current_model().await,
        }
    }

    /// Load the current default model so the first request does not pay for it
    pub async fn warm_up(&self) -> Result<()> {
        let model = self.current_model().await;
        self.load_model(&model).await.map(|_| ())
    }

    /// Fetch a model from the cache, loading it on first use
    pub async fn load_model(&self, name: &str) -> Result<Arc<Classifier>> {
        if let Some(classifier) = self.cache.get(name) {
            return Ok(classifier);
        }

        let store = self.store.clone();
        let metrics = self.metrics.clone();
        let logger = self.logger.clone();
        let model = name.to_string();

        let result = self
            .cache
            .get_or_load(name, move || {
                let start = Instant::now();
                let classifier = store.load_classifier(&model)?;
                metrics.inc_model_loads();

                if let Some(declared) = classifier.capabilities().declared_features {
                    if !classifier.matches_feature_layout() {
                        warn!(
                            check = "feature_layout",
                            model = %model,
                            declared_features = declared,
                            extracted_features = FEATURE_COUNT,
                            "Model input width disagrees with the feature layout; scoring it will fail"
                        );
                    }
                }
                logger.log_model_loaded(&model, classifier.checksum(), start.elapsed().as_millis());
                Ok(classifier)
            })
            .await;

        self.metrics.set_models_loaded(self.cache.len());
        if let Err(e) = &result {
            self.logger.log_model_load_failed(name, e.kind(), &e.to_string());
        }
        result
    }

    /// Score one posting.
    ///
    /// A `modelName` key in the posting selects the model and is removed
    /// before feature extraction.
    pub async fn predict(&self, mut posting: JobPosting) -> Result<PredictionResult> {
        if posting.is_empty() {
            self.metrics.inc_prediction_errors();
            return Err(ScoringError::MalformedInput(EMPTY_BODY_MESSAGE.to_string()));
        }

        let model_name = match posting.take_model_name() {
            Some(name) => name,
            None => self.current_model().await,
        };
        self.run_prediction(&posting, &model_name).await
    }

    /// Score one posting with an explicitly chosen model.
    ///
    /// Any `modelName` key in the posting is ignored. An empty posting is
    /// scored on default feature values.
    pub async fn predict_with_model(
        &self,
        mut posting: JobPosting,
        model_name: &str,
    ) -> Result<PredictionResult> {
        posting.take_model_name();
        self.run_prediction(&posting, model_name).await
    }

    async fn run_prediction(
        &self,
        posting: &JobPosting,
        model_name: &str,
    ) -> Result<PredictionResult> {
        let start = Instant::now();
        let result = self.score(posting, model_name).await;
        self.metrics.observe_prediction_latency(start.elapsed().as_secs_f64());

        match &result {
            Ok(prediction) => {
                self.metrics.inc_predictions();
                self.logger.log_prediction(
                    &prediction.model_name,
                    prediction.prediction,
                    prediction.probability,
                    prediction.risk_score,
                    prediction.risk_level.as_str(),
                );
            }
            Err(e) => {
                self.metrics.inc_prediction_errors();
                self.logger.log_prediction_failed(model_name, e.kind(), &e.to_string());
            }
        }
        result
    }

    async fn score(&self, posting: &JobPosting, model_name: &str) -> Result<PredictionResult> {
        let classifier = self.load_model(model_name).await?;
        let features = self.extractor.extract(posting, &self.artifacts);
        debug!(model = %model_name, "Features extracted");
        self.engine
            .try_score(&features, &classifier, &self.artifacts, model_name)
    }

    /// Make `name` the default model, loading it if needed.
    ///
    /// On failure the previous default stays active.
    pub async fn switch(&self, name: &str) -> Result<SwitchResponse> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScoringError::MalformedInput(
                MISSING_MODEL_NAME_MESSAGE.to_string(),
            ));
        }

        self.load_model(name).await?;

        let previous = {
            let mut current = self.current_model.write().await;
            std::mem::replace(&mut *current, name.to_string())
        };
        if previous != name {
            self.metrics.set_current_model(name);
            self.logger.log_model_switched(&previous, name);
        }

        Ok(SwitchResponse {
            success: true,
            message: format!("已切换到模型: {}", name),
        })
    }

    /// Catalog models first, then any other models found in the directory
    pub async fn list_models(&self) -> ModelListing {
        let current = self.current_model().await;
        let on_disk = self.store.model_names();

        let catalog_names = CATALOG.iter().map(|entry| entry.name.to_string());
        let extra_names = on_disk
            .iter()
            .filter(|name| !CATALOG.iter().any(|entry| entry.name == name.as_str()))
            .cloned();

        let models = catalog_names
            .chain(extra_names)
            .map(|name| {
                ModelInfo::describe(
                    &name,
                    on_disk.contains(&name),
                    name == current,
                    self.cache.get(&name).map(|classifier| classifier.loaded_at()),
                )
            })
            .collect();

        ModelListing {
            success: true,
            current_model: current,
            feature_schema_version: FEATURE_SCHEMA_VERSION,
            models,
        }
    }
}
