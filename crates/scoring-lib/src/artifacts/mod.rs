//! Read-only access to the artifact directory
//!
//! The directory holds one file per trained model plus optional
//! preprocessing helpers (scaler, label encoders, feature statistics).
//! Missing helpers are absent capabilities, never errors.

mod preprocess;
mod store;

pub use preprocess::{
    ArtifactBundle, ArtifactKind, FeatureStats, LabelEncoder, LabelEncoders, StandardScaler,
};
pub use store::{ArtifactFormat, ArtifactStore, ResolvedArtifact, MODEL_EXTENSIONS};
