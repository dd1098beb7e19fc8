//! Remote blob store snapshot source.
//!
//! The bot uploads each snapshot under a fixed logical name, deleting any
//! prior blob first, so the store holds at most one live object per name.
//! `RemoteSource` leans on that invariant: list the prefix, take the first
//! entry, GET its content.
//!
//! Auth: `Authorization: Bearer {token}` on list/put/delete; blob content
//! GETs are public and unconditional.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::StateSource;
use crate::error::StateError;
use crate::types::StateDocument;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const DEFAULT_BASE_URL: &str = "https://blob.vercel-storage.com";
const SOURCE_NAME: &str = "blob";

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

/// One object in a blob listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    pub url: String,
    pub pathname: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Abstraction over the remote object store.
///
/// The read path only needs `list` and `get`; `put` and `delete` serve the
/// writer (upload) endpoint. Tests substitute an in-memory implementation.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// List objects whose name matches the prefix, in store order.
    async fn list(&self, prefix: &str) -> Result<Vec<BlobInfo>, StateError>;

    /// Fetch an object's content by URL (unconditional GET).
    async fn get(&self, url: &str) -> Result<Vec<u8>, StateError>;

    /// Create an object under the given name, without a random suffix.
    async fn put(&self, name: &str, body: &[u8]) -> Result<BlobInfo, StateError>;

    /// Delete an object by URL.
    async fn delete(&self, url: &str) -> Result<(), StateError>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Response shape of the store's list endpoint.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    blobs: Vec<BlobInfo>,
}

/// Vercel-Blob-style HTTP store client.
pub struct VercelBlobClient {
    http: Client,
    base_url: String,
    token: SecretString,
}

impl VercelBlobClient {
    /// Create a new store client. `base_url` overrides the public store
    /// endpoint (testing, alternate deployments).
    pub fn new(token: SecretString, base_url: Option<String>) -> Result<Self, StateError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("VANTAGE/0.1.0 (trading-dashboard)")
            .build()
            .map_err(|e| StateError::Io(format!("Failed to build blob HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token,
        })
    }
}

#[async_trait]
impl BlobStore for VercelBlobClient {
    async fn list(&self, prefix: &str) -> Result<Vec<BlobInfo>, StateError> {
        let url = format!("{}/?prefix={}", self.base_url, urlencoding::encode(prefix));
        debug!(url = %url, "Listing blobs");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StateError::Io(format!(
                "Blob listing failed: {}",
                resp.status()
            )));
        }

        let listing: ListResponse = resp
            .json()
            .await
            .map_err(|e| StateError::Io(format!("Malformed blob listing: {e}")))?;

        Ok(listing.blobs)
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, StateError> {
        let resp = self.http.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(StateError::Io(format!(
                "Failed to fetch state blob: {}",
                resp.status()
            )));
        }

        Ok(resp.bytes().await?.to_vec())
    }

    async fn put(&self, name: &str, body: &[u8]) -> Result<BlobInfo, StateError> {
        let url = format!("{}/{}", self.base_url, name);

        let resp = self
            .http
            .put(&url)
            .bearer_auth(self.token.expose_secret())
            .header("x-add-random-suffix", "0")
            .header("x-content-type", "application/json")
            .body(body.to_vec())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StateError::Io(format!(
                "Blob upload failed: {}",
                resp.status()
            )));
        }

        let info: BlobInfo = resp
            .json()
            .await
            .map_err(|e| StateError::Io(format!("Malformed blob upload response: {e}")))?;

        Ok(info)
    }

    async fn delete(&self, url: &str) -> Result<(), StateError> {
        let endpoint = format!("{}/delete", self.base_url);

        let resp = self
            .http
            .post(&endpoint)
            .bearer_auth(self.token.expose_secret())
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StateError::Io(format!(
                "Blob delete failed: {}",
                resp.status()
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Remote reader
// ---------------------------------------------------------------------------

/// Snapshot source reading the latest blob under the fixed prefix.
pub struct RemoteSource {
    store: Arc<dyn BlobStore>,
    prefix: String,
}

impl RemoteSource {
    pub fn new(store: Arc<dyn BlobStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Resolve the URL of the current latest snapshot blob.
    ///
    /// The writer deletes before re-creating under the fixed name, so the
    /// listing holds at most one live object; the first entry wins.
    pub async fn latest_url(&self) -> Result<String, StateError> {
        let blobs = self.store.list(&self.prefix).await?;
        blobs.into_iter().next().map(|b| b.url).ok_or_else(|| {
            StateError::NotFound("State not found. Upload state data first.".to_string())
        })
    }

    /// Fetch and parse the snapshot at the given URL.
    pub async fn fetch(&self, url: &str) -> Result<StateDocument, StateError> {
        let bytes = self.store.get(url).await?;
        let doc: StateDocument = serde_json::from_slice(&bytes)?;
        debug!(url, traders = doc.traders.len(), "Remote state fetched");
        Ok(doc)
    }
}

#[async_trait]
impl StateSource for RemoteSource {
    async fn load(&self) -> Result<StateDocument, StateError> {
        let url = self.latest_url().await?;
        self.fetch(&url).await
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
