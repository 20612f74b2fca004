//! Filesystem artifact store

use super::preprocess::{ArtifactBundle, ArtifactKind};
use crate::error::{Result, ScoringError};
use crate::predictor::Classifier;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Model file extensions, in resolution order
pub const MODEL_EXTENSIONS: [&str; 2] = ["onnx", "json"];

/// On-disk encoding of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Onnx,
    Json,
}

impl ArtifactFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "onnx" => Some(ArtifactFormat::Onnx),
            "json" => Some(ArtifactFormat::Json),
            _ => None,
        }
    }
}

/// Raw bytes of a named artifact
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub name: String,
    pub path: PathBuf,
    pub format: ArtifactFormat,
    pub bytes: Vec<u8>,
}

/// Read-only view of the artifact directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the artifact directory exists
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Filesystem path an artifact name resolves to, if any
    fn locate(&self, name: &str) -> Result<Option<(PathBuf, ArtifactFormat)>> {
        validate_name(name)?;
        for ext in MODEL_EXTENSIONS {
            let path = self.root.join(format!("{}.{}", name, ext));
            if path.is_file() {
                if let Some(format) = ArtifactFormat::from_extension(ext) {
                    return Ok(Some((path, format)));
                }
            }
        }
        Ok(None)
    }

    /// Whether a named artifact exists
    pub fn contains(&self, name: &str) -> bool {
        matches!(self.locate(name), Ok(Some(_)))
    }

    /// Read the bytes of a named artifact
    pub fn resolve(&self, name: &str) -> Result<ResolvedArtifact> {
        let (path, format) = self
            .locate(name)?
            .ok_or_else(|| ScoringError::not_found(name))?;

        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ScoringError::not_found(name),
            _ => ScoringError::Io(e),
        })?;

        debug!(artifact = %name, path = %path.display(), size = bytes.len(), "Artifact resolved");

        Ok(ResolvedArtifact {
            name: name.to_string(),
            path,
            format,
            bytes,
        })
    }

    /// Decode a JSON artifact
    pub fn deserialize<T: DeserializeOwned>(&self, artifact: &ResolvedArtifact) -> Result<T> {
        if artifact.format != ArtifactFormat::Json {
            return Err(ScoringError::deserialization(
                &artifact.name,
                "expected a JSON artifact",
            ));
        }
        serde_json::from_slice(&artifact.bytes)
            .map_err(|e| ScoringError::deserialization(&artifact.name, e))
    }

    /// Helper artifact kinds present in the directory
    pub fn list_available(&self) -> HashSet<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| self.contains(&kind.file_stem()))
            .collect()
    }

    /// Names of model artifacts in the directory, sorted
    pub fn model_names(&self) -> Vec<String> {
        let helpers: HashSet<String> = ArtifactKind::ALL.iter().map(|k| k.file_stem()).collect();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.root.display(), error = %e, "Artifact directory unreadable");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(ArtifactFormat::from_extension)
                    .is_some()
            })
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .filter(|stem| !helpers.contains(stem))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Load every helper artifact that exists.
    ///
    /// Helpers that are missing or fail to decode are skipped with a
    /// warning; the matching preprocessing step is then not applied.
    pub fn load_bundle(&self) -> ArtifactBundle {
        let bundle = ArtifactBundle {
            scaler: self.load_helper(ArtifactKind::Scaler),
            encoders: self.load_helper(ArtifactKind::Encoders),
            stats: self.load_helper(ArtifactKind::Stats),
        };

        if let Some(stats) = &bundle.stats {
            for problem in stats.layout_mismatches() {
                warn!(check = "feature_layout", "{}", problem);
            }
        }

        info!(
            dir = %self.root.display(),
            scaler = bundle.scaler.is_some(),
            encoders = bundle.encoders.as_ref().map(|e| e.len()).unwrap_or(0),
            stats = bundle.stats.is_some(),
            "Preprocessing artifacts loaded"
        );
        bundle
    }

    fn load_helper<T: DeserializeOwned>(&self, kind: ArtifactKind) -> Option<T> {
        let stem = kind.file_stem();
        let artifact = match self.resolve(&stem) {
            Ok(artifact) => artifact,
            Err(ScoringError::ArtifactNotFound { .. }) => {
                debug!(artifact = %stem, "Optional artifact absent");
                return None;
            }
            Err(e) => {
                warn!(artifact = %stem, error = %e, "Failed to read optional artifact, skipping");
                return None;
            }
        };

        match self.deserialize(&artifact) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(artifact = %stem, error = %e, "Failed to decode optional artifact, skipping");
                None
            }
        }
    }

    /// Resolve and decode a model
    pub fn load_classifier(&self, name: &str) -> Result<Classifier> {
        let artifact = self.resolve(name)?;
        let classifier = Classifier::from_artifact(&artifact)?;
        info!(
            model = %name,
            path = %artifact.path.display(),
            checksum = %classifier.checksum(),
            probability = classifier.capabilities().probability,
            declared_features = ?classifier.capabilities().declared_features,
            "Model artifact decoded"
        );
        Ok(classifier)
    }
}

/// Artifact names are bare file stems
fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains('\0');
    if invalid {
        return Err(ScoringError::MalformedInput(format!(
            "invalid model name: {:?}",
            name
        )));
    }
    Ok(())
}
