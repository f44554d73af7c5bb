//! Application configuration for PaperGraph.
//!
//! User config lives at `~/.papergraph/papergraph.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! Environment access stays at this boundary and in the CLI; core components
//! receive explicit config values through their constructors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PaperGraphError, Result};
use crate::types::Thresholds;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "papergraph.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".papergraph";

// ---------------------------------------------------------------------------
// Config structs (matching papergraph.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Classifier similarity thresholds.
    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    /// Embedding collaborator settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory containing downloaded paper source bundles.
    #[serde(default = "default_source_root")]
    pub source_root: String,

    /// Path to the local graph database.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Default number of anchor papers retrieved per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Concurrent per-paper extraction tasks during ingest.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            db_path: default_db_path(),
            top_k: default_top_k(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_source_root() -> String {
    "arxiv_source".into()
}
fn default_db_path() -> String {
    "~/.papergraph/papergraph.db".into()
}
fn default_top_k() -> usize {
    3
}
fn default_concurrency() -> usize {
    4
}

/// `[thresholds]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Similarity above this is "high" (same problem / same method).
    #[serde(default = "default_threshold_high")]
    pub high: f32,

    /// Similarity below this is "low" (different problem / different method).
    #[serde(default = "default_threshold_low")]
    pub low: f32,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            high: default_threshold_high(),
            low: default_threshold_low(),
        }
    }
}

fn default_threshold_high() -> f32 {
    0.75
}
fn default_threshold_low() -> f32 {
    0.5
}

impl From<&ThresholdsConfig> for Thresholds {
    fn from(config: &ThresholdsConfig) -> Self {
        Self {
            high: config.high,
            low: config.low,
        }
    }
}

/// `[embedding]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: "hash" (deterministic, in-process) or "http".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// HTTP endpoint of the embedding service (required for "http").
    #[serde(default)]
    pub endpoint: String,

    /// Model identifier passed to the embedding service.
    #[serde(default = "default_model")]
    pub model: String,

    /// Fixed embedding dimensionality, shared with the graph schema.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: String::new(),
            model: default_model(),
            dimension: default_dimension(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_provider() -> String {
    "hash".into()
}
fn default_model() -> String {
    "all-MiniLM-L6-v2".into()
}
fn default_dimension() -> usize {
    384
}
fn default_api_key_env() -> String {
    "PAPERGRAPH_EMBED_API_KEY".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.papergraph/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PaperGraphError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.papergraph/papergraph.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PaperGraphError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PaperGraphError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PaperGraphError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PaperGraphError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PaperGraphError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` against the user's home directory.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| PaperGraphError::config("could not determine home directory"))?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Validate the configuration before any work starts.
///
/// These are the fatal cases: everything else has a usable default.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.embedding.dimension == 0 {
        return Err(PaperGraphError::config(
            "embedding dimension must be positive",
        ));
    }

    if config.thresholds.high <= config.thresholds.low {
        return Err(PaperGraphError::config(format!(
            "threshold high ({}) must be greater than threshold low ({})",
            config.thresholds.high, config.thresholds.low
        )));
    }

    match config.embedding.provider.as_str() {
        "hash" => Ok(()),
        "http" => {
            if config.embedding.endpoint.is_empty() {
                return Err(PaperGraphError::config(
                    "embedding.endpoint is required when embedding.provider = \"http\"",
                ));
            }
            url::Url::parse(&config.embedding.endpoint).map_err(|e| {
                PaperGraphError::config(format!(
                    "invalid embedding endpoint '{}': {e}",
                    config.embedding.endpoint
                ))
            })?;
            Ok(())
        }
        other => Err(PaperGraphError::config(format!(
            "unknown embedding provider '{other}' (expected \"hash\" or \"http\")"
        ))),
    }
}
