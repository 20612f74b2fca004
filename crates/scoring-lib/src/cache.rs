//! Process-lifetime model cache
//!
//! Each model name owns one slot. The first request for a name runs the
//! loader; concurrent requests for the same name wait on that load instead of
//! starting their own. A failed load removes the slot, unless another request
//! is still waiting on it, so the next request retries from scratch.

use crate::error::{Result, ScoringError};
use crate::predictor::Classifier;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

type Slot = Arc<OnceCell<Arc<Classifier>>>;

/// Memoized mapping from model name to loaded classifier
#[derive(Debug, Default)]
pub struct ModelCache {
    slots: DashMap<String, Slot>,
    loads: AtomicU64,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached classifier for `name`, running `load` on a blocking
    /// thread if it is not loaded yet.
    pub async fn get_or_load<F>(&self, name: &str, load: F) -> Result<Arc<Classifier>>
    where
        F: FnOnce() -> Result<Classifier> + Send + 'static,
    {
        let slot = self.slots.entry(name.to_string()).or_default().clone();

        let result = slot
            .get_or_try_init(|| async {
                self.loads.fetch_add(1, Ordering::Relaxed);
                debug!(model = %name, "Loading model into cache");
                let classifier = tokio::task::spawn_blocking(load)
                    .await
                    .map_err(|e| std::io::Error::other(format!("model load task failed: {}", e)))??;
                Ok::<_, ScoringError>(Arc::new(classifier))
            })
            .await
            .cloned();

        if result.is_err() {
            // Map plus this handle: nobody else is waiting on the slot
            self.slots.remove_if(name, |_, current| {
                Arc::ptr_eq(current, &slot)
                    && !current.initialized()
                    && Arc::strong_count(current) == 2
            });
        }
        result
    }

    /// Cached classifier, without loading
    pub fn get(&self, name: &str) -> Option<Arc<Classifier>> {
        self.slots.get(name).and_then(|slot| slot.get().cloned())
    }

    /// Number of loaded models
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of load attempts started, successful or not
    pub fn load_attempts(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}
