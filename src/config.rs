//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the blob read/write token and the upload key) are referenced
//! by env-var name in the config and resolved at runtime via
//! `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub state: StateConfig,
    pub blob: BlobConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Where the bot's state snapshot lives and how to pick between sources.
#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    /// Path of the state file the bot writes when running alongside us.
    pub local_path: String,
    /// Force the local file even when a blob token is configured.
    #[serde(default)]
    pub force_local: bool,
    /// Fixed logical name the writer uploads snapshots under.
    pub blob_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlobConfig {
    /// Env var holding the blob store read/write token.
    pub token_env: String,
    /// Env var holding the shared secret for the upload endpoint.
    pub upload_key_env: String,
    /// Override the blob store base URL (testing, alternate stores).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
