//! Configuration management for GameVault.
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! `gamevault.toml` file, and environment variables. Environment variables
//! take the highest precedence.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::nlp::NerConfig;

/// Default config filename discovered in the working directory.
pub const CONFIG_FILENAME: &str = "gamevault.toml";

/// Default bind address for the web server.
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

/// Placeholder store endpoint (the local emulator's address).
pub const DEFAULT_STORE_ENDPOINT: &str = "https://localhost:8081";

/// Placeholder access key. This is the emulator's published key and is
/// not a secret; real deployments must set COSMOSDB_KEY.
pub const DEFAULT_STORE_KEY: &str =
    "C2y6yDjf5/R+ob0N8A7Cgv30VRDJIWEHLM+4QDU5DE2nQ9nDuVTqobD4b8mGGyPMbIZnqyMsEcaGQy67XIw/Jw==";

fn default_store_endpoint() -> String {
    DEFAULT_STORE_ENDPOINT.to_string()
}
fn default_store_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}
fn default_database() -> String {
    "GameVault".to_string()
}
fn default_container() -> String {
    "Products".to_string()
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Connection settings for the external document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the store account.
    #[serde(default = "default_store_endpoint")]
    pub endpoint: String,
    /// Master access key sent with every request.
    #[serde(default = "default_store_key")]
    pub key: String,
    /// Database name.
    #[serde(default = "default_database")]
    pub database: String,
    /// Container (collection) name.
    #[serde(default = "default_container")]
    pub container: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            endpoint: default_store_endpoint(),
            key: default_store_key(),
            database: default_database(),
            container: default_container(),
        }
    }
}

impl StoreSettings {
    /// Access key with all but the last four characters masked, for display.
    pub fn redacted_key(&self) -> String {
        let tail: String = self
            .key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{}", tail)
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Document store connection.
    #[serde(default)]
    pub store: StoreSettings,
    /// NLP service used for entity extraction.
    #[serde(default)]
    pub nlp: NerConfig,
    /// Web server bind address.
    #[serde(default)]
    pub server: ServerSettings,
}

/// Web server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address, as `PORT`, `HOST`, or `HOST:PORT`.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then the config file (explicit path or
    /// `gamevault.toml` in the working directory), then environment overrides.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match resolve_config_path(config_path) {
            Some(path) => {
                tracing::debug!("Loading config from: {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Apply environment variable overrides on top of the current values.
    pub fn apply_env(&mut self) {
        if let Some(url) = env_var("COSMOSDB_URL") {
            tracing::debug!("Using COSMOSDB_URL from environment");
            self.store.endpoint = url;
        }
        if let Some(key) = env_var("COSMOSDB_KEY") {
            tracing::debug!("Using COSMOSDB_KEY from environment");
            self.store.key = key;
        }
        if let Some(endpoint) = env_var("GAMEVAULT_NLP_ENDPOINT") {
            tracing::debug!("Using GAMEVAULT_NLP_ENDPOINT from environment: {}", endpoint);
            self.nlp.endpoint = endpoint;
        }
        if let Some(model) = env_var("GAMEVAULT_NLP_MODEL") {
            tracing::debug!("Using GAMEVAULT_NLP_MODEL from environment: {}", model);
            self.nlp.model = model;
        }
        if let Some(bind) = env_var("GAMEVAULT_BIND") {
            tracing::debug!("Using GAMEVAULT_BIND from environment: {}", bind);
            self.server.bind = bind;
        }
    }

    /// Check that the configured endpoints are well-formed URLs.
    pub fn validate(&self) -> anyhow::Result<()> {
        Url::parse(&self.store.endpoint)
            .with_context(|| format!("Invalid store endpoint: {}", self.store.endpoint))?;
        Url::parse(&self.nlp.endpoint)
            .with_context(|| format!("Invalid NLP endpoint: {}", self.nlp.endpoint))?;
        Ok(())
    }

    /// Render settings as TOML with the access key redacted.
    pub fn to_display_toml(&self) -> anyhow::Result<String> {
        let mut display = self.clone();
        display.store.key = display.store.redacted_key();
        toml::to_string_pretty(&display).context("Failed to serialize settings")
    }
}

/// Resolve which config file to use, if any.
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILENAME);
    local.exists().then_some(local)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
