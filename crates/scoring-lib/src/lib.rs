//! Scoring library for job-posting fraud detection
//!
//! This crate provides the core functionality for:
//! - Reading trained model and preprocessing artifacts
//! - Feature extraction from loosely structured postings
//! - Classifier inference and risk reporting
//! - A memoized, concurrency-safe model cache
//! - Observability

pub mod artifacts;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod service;

pub use artifacts::{ArtifactBundle, ArtifactStore};
pub use cache::ModelCache;
pub use error::{Result, ScoringError};
pub use models::*;
pub use observability::{ScoringMetrics, StructuredLogger};
pub use service::{HealthStatus, ModelListing, ScoringService, SwitchResponse};
