//! Single-shot local prediction
//!
//! Scores one posting against the artifacts on disk and writes exactly one
//! JSON line to stdout. Scoring failures are reported in that line, not via
//! the exit status.

use anyhow::{Context, Result};
use scoring_lib::{ArtifactStore, ErrorResponse, JobPosting, ScoreOutcome, ScoringService};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::output::print_json_line;

/// Read the posting from the argument, or from stdin when absent
pub fn read_payload(payload: Option<String>) -> Result<String> {
    match payload {
        Some(payload) => Ok(payload),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read posting from stdin")?;
            Ok(buffer.trim().to_string())
        }
    }
}

/// Score `payload` with `model` from `model_dir`
pub async fn score(model_dir: &Path, model: &str, payload: &str) -> ScoreOutcome {
    let store = ArtifactStore::new(model_dir);
    debug!(model_dir = %store.root().display(), model = %model, "Scoring posting");

    let service = ScoringService::new(store, model);
    match JobPosting::from_json_str(payload) {
        Ok(posting) => service.predict_with_model(posting, model).await.into(),
        Err(e) => ScoreOutcome::Failed(ErrorResponse::from(&e)),
    }
}

pub async fn run(model_dir: &Path, model: &str, payload: Option<String>) -> Result<()> {
    let outcome = match read_payload(payload) {
        Ok(payload) => score(model_dir, model, &payload).await,
        Err(e) => ScoreOutcome::Failed(ErrorResponse::new(e.to_string())),
    };
    print_json_line(&outcome)
}
