//! Snapshot sources.
//!
//! Defines the `StateSource` trait and provides implementations for:
//! - Local — the state file the bot writes on the same host
//! - Remote — the latest blob under a fixed name at the object store

pub mod blob;
pub mod local;

use async_trait::async_trait;

use crate::error::StateError;
use crate::types::StateDocument;

/// Uniform read contract over the interchangeable snapshot backends.
///
/// Implementors fetch one raw state document or fail with a `StateError`
/// that preserves the failure kind (not found, transport, parse). Reads
/// have no side effects.
#[async_trait]
pub trait StateSource: Send + Sync {
    /// Fetch the current state document from this backend.
    async fn load(&self) -> Result<StateDocument, StateError>;

    /// Backend name for logging and identification.
    fn name(&self) -> &str;
}
