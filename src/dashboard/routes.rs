//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardContext>`.
//! Failures surface as `StateError` and map straight to HTTP statuses; no
//! handler ever serves partial aggregates when the document could not be
//! obtained.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::StateError;
use crate::history::{self, TradeHistoryView};
use crate::metrics::{self, PortfolioMetrics};
use crate::resolver::StateResolver;
use crate::source::blob::BlobStore;
use crate::types::StateDocument;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardContext {
    pub resolver: StateResolver,
    /// Write-capable store handle for the upload endpoint. Absent when no
    /// blob token is configured.
    pub store: Option<Arc<dyn BlobStore>>,
    /// Shared secret for the upload endpoint, compared for exact equality.
    pub upload_key: Option<SecretString>,
    /// Fixed logical name snapshots live under at the store.
    pub blob_prefix: String,
}

pub type AppState = Arc<DashboardContext>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// The resolved document with portfolio metrics merged in — the
/// document's own fields stay at the top level, metrics ride alongside.
#[derive(Debug, Clone, Serialize)]
pub struct StateView {
    #[serde(flatten)]
    pub document: StateDocument,
    pub metrics: PortfolioMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub symbol: Option<String>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Result<Json<StateView>, StateError> {
    let doc = state.resolver.resolve().await?;
    let metrics = metrics::aggregate(&doc);

    debug!(
        symbols = metrics.symbol_count,
        total_value = %metrics.total_value,
        "State resolved"
    );

    Ok(Json(StateView {
        document: (*doc).clone(),
        metrics,
    }))
}

/// GET /api/history?symbol=XXX
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<TradeHistoryView>, StateError> {
    let doc = state.resolver.resolve().await?;
    let view = history::assemble(&doc, query.symbol.as_deref());

    debug!(
        trades = view.total_count,
        filter = query.symbol.as_deref().unwrap_or("none"),
        "History assembled"
    );

    Ok(Json(view))
}

/// POST /api/upload
///
/// Writer endpoint: authenticates via the shared secret, deletes any
/// existing snapshot under the fixed name (best-effort), then creates the
/// new one without a random suffix — which is what guarantees the reader's
/// "at most one live object" invariant.
pub async fn upload_state(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, StateError> {
    let expected = state.upload_key.as_ref().ok_or(StateError::NotConfigured)?;
    let provided = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided != expected.expose_secret() {
        return Err(StateError::Unauthorized);
    }

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| StateError::InvalidInput)?;
    if !payload.is_object() {
        return Err(StateError::InvalidInput);
    }

    let store = state.store.as_ref().ok_or(StateError::NotConfigured)?;

    // Best-effort delete of the previous snapshot; the blob may simply not
    // exist yet.
    match store.list(&state.blob_prefix).await {
        Ok(blobs) => {
            if let Some(prev) = blobs.first() {
                if let Err(e) = store.delete(&prev.url).await {
                    debug!(error = %e, url = %prev.url, "Stale snapshot delete failed");
                }
            }
        }
        Err(e) => debug!(error = %e, "Listing before upload failed"),
    }

    let blob = store.put(&state.blob_prefix, &body).await?;
    info!(url = %blob.url, bytes = body.len(), "State snapshot uploaded");

    Ok(Json(UploadResponse {
        success: true,
        url: blob.url,
        timestamp: Utc::now(),
    }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
