//! VANTAGE — Dashboard backend for a multi-symbol trading bot
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the state resolver (local file and/or cached blob store), and
//! serves the dashboard API with graceful shutdown.

use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};

use vantage::cache::StateCache;
use vantage::config;
use vantage::dashboard;
use vantage::dashboard::routes::DashboardContext;
use vantage::resolver::StateResolver;
use vantage::source::blob::{BlobStore, RemoteSource, VercelBlobClient};
use vantage::source::local::LocalSource;

const BANNER: &str = r#"
__     ___    _   _ _____  _    ____ _____
\ \   / / \  | \ | |_   _|/ \  / ___| ____|
 \ \ / / _ \ |  \| | | | / _ \| |  _|  _|
  \ V / ___ \| |\  | | |/ ___ \ |_| | |___
   \_/_/   \_\_| \_| |_/_/   \_\____|_____|

  Multi-Symbol Trading Bot Dashboard
  v0.1.0 — State & Analytics Backend
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        port = cfg.server.port,
        local_path = %cfg.state.local_path,
        force_local = cfg.state.force_local,
        blob_prefix = %cfg.state.blob_prefix,
        "VANTAGE starting up"
    );

    // -- Wire the state pipeline -----------------------------------------

    let local = LocalSource::new(&cfg.state.local_path);

    let token = std::env::var(&cfg.blob.token_env).ok();
    let upload_key = std::env::var(&cfg.blob.upload_key_env)
        .ok()
        .map(SecretString::new);

    let (cache, store): (Option<StateCache>, Option<Arc<dyn BlobStore>>) = match token {
        Some(token) => {
            let client = Arc::new(VercelBlobClient::new(
                SecretString::new(token),
                cfg.blob.base_url.clone(),
            )?);
            let store: Arc<dyn BlobStore> = client;
            let remote = RemoteSource::new(Arc::clone(&store), cfg.state.blob_prefix.clone());
            info!("Blob store configured, serving cached remote state");
            (Some(StateCache::new(remote)), Some(store))
        }
        None => {
            warn!(
                token_env = %cfg.blob.token_env,
                "No blob token configured — serving local state only"
            );
            (None, None)
        }
    };

    if upload_key.is_none() {
        warn!(
            upload_key_env = %cfg.blob.upload_key_env,
            "No upload key configured — the upload endpoint will refuse requests"
        );
    }

    let resolver = StateResolver::new(local, cache, cfg.state.force_local);

    let ctx = Arc::new(DashboardContext {
        resolver,
        store,
        upload_key,
        blob_prefix: cfg.state.blob_prefix.clone(),
    });

    // -- Serve ------------------------------------------------------------

    dashboard::serve(ctx, cfg.server.port).await?;

    info!("VANTAGE shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vantage=info"));

    let json_logging = std::env::var("VANTAGE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
