//! Local file snapshot source.
//!
//! Reads the state file the bot writes directly to disk. Local reads are
//! cheap and always current, so nothing in front of this caches them.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::StateSource;
use crate::error::StateError;
use crate::types::StateDocument;

const SOURCE_NAME: &str = "local";

/// Snapshot source backed by a well-known file path.
pub struct LocalSource {
    path: PathBuf,
}

impl LocalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateSource for LocalSource {
    async fn load(&self) -> Result<StateDocument, StateError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StateError::NotFound(
                    "State file not found. Start the trading bot first.".to_string(),
                ));
            }
            Err(e) => return Err(StateError::Io(e.to_string())),
        };

        let doc: StateDocument = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), traders = doc.traders.len(), "Local state loaded");
        Ok(doc)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
