//! Source selection policy.
//!
//! Chooses between the local state file and the cached remote store and
//! produces one canonical state document. Pure routing: no retries, no
//! recovery — failures propagate unchanged from whichever path was taken.

use std::sync::Arc;
use tracing::debug;

use crate::cache::StateCache;
use crate::error::StateError;
use crate::source::local::LocalSource;
use crate::source::StateSource;
use crate::types::StateDocument;

/// Routes reads to the right backend and owns the cache slot.
pub struct StateResolver {
    local: LocalSource,
    cache: Option<StateCache>,
    force_local: bool,
}

impl StateResolver {
    /// `cache` is `None` when no blob credential is configured — the
    /// resolver then always reads the local file.
    pub fn new(local: LocalSource, cache: Option<StateCache>, force_local: bool) -> Self {
        Self {
            local,
            cache,
            force_local,
        }
    }

    /// Produce the canonical state document.
    ///
    /// Local reads are uncached: they are cheap and always current.
    pub async fn resolve(&self) -> Result<Arc<StateDocument>, StateError> {
        if !self.force_local {
            if let Some(cache) = &self.cache {
                return cache.get().await;
            }
        }

        debug!(source = self.local.name(), "Resolving state from local file");
        self.local.load().await.map(Arc::new)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
