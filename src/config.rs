//! TOML configuration parsing and validation.
//!
//! Secrets never live in the file: each external service names the
//! environment variable that holds its key (`api_key_env`), and the key is
//! resolved when the client is constructed.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub search: SearchConfig,
    pub generation: GenerationConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub index: String,
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_search_api_version")]
    pub api_version: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_search_key_env() -> String {
    "AZURE_SEARCH_API_KEY".to_string()
}
fn default_search_api_version() -> String {
    "2023-11-01".to_string()
}
fn default_top_k() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub deployment: String,
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_chat_api_version")]
    pub api_version: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_openai_key_env() -> String {
    "AZURE_OPENAI_API_KEY".to_string()
}
fn default_chat_api_version() -> String {
    "2024-12-01-preview".to_string()
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f32 {
    0.2
}

/// Embedding settings, only used by `guide index`.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub deployment: Option<String>,
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_embedding_api_version")]
    pub api_version: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment: None,
            api_key_env: default_openai_key_env(),
            api_version: default_embedding_api_version(),
            dims: default_dims(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_embedding_retries(),
        }
    }
}

fn default_embedding_api_version() -> String {
    "2024-02-01".to_string()
}
fn default_dims() -> usize {
    1536
}
fn default_batch_size() -> usize {
    16
}
fn default_embedding_retries() -> u32 {
    5
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some() && self.deployment.is_some()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexingConfig {
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    #[serde(default = "default_upload_batch_size")]
    pub upload_batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            include_globs: default_include_globs(),
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            upload_batch_size: default_upload_batch_size(),
        }
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}
fn default_include_globs() -> Vec<String> {
    vec!["*.txt".to_string()]
}
fn default_chunk_size() -> usize {
    1100
}
fn default_overlap() -> usize {
    200
}
fn default_upload_batch_size() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Wall-clock budget for one request, classify through generate.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_max_retries")]
    pub store_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
            max_context_chars: default_max_context_chars(),
            store_retries: default_max_retries(),
        }
    }
}

fn default_deadline_secs() -> u64 {
    30
}
fn default_max_context_chars() -> usize {
    12_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Reads the secret named by `env_name`, failing with a message that names
/// the variable but never its value.
pub fn resolve_secret(env_name: &str) -> Result<String> {
    match std::env::var(env_name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("{} environment variable not set", env_name),
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.search.top_k == 0 {
        bail!("search.top_k must be >= 1");
    }
    if config.search.endpoint.trim().is_empty() {
        bail!("search.endpoint must not be empty");
    }
    if config.generation.deployment.trim().is_empty() {
        bail!("generation.deployment must not be empty");
    }
    if !(0.0..=2.0).contains(&config.generation.temperature) {
        bail!("generation.temperature must be in [0.0, 2.0]");
    }
    if config.pipeline.deadline_secs == 0 {
        bail!("pipeline.deadline_secs must be > 0");
    }
    if config.pipeline.max_context_chars == 0 {
        bail!("pipeline.max_context_chars must be > 0");
    }

    let idx = &config.indexing;
    if idx.chunk_size == 0 {
        bail!("indexing.chunk_size must be > 0");
    }
    if idx.overlap >= idx.chunk_size {
        bail!("indexing.overlap must be smaller than indexing.chunk_size");
    }
    if idx.upload_batch_size == 0 {
        bail!("indexing.upload_batch_size must be > 0");
    }

    if config.embedding.is_enabled() {
        if config.embedding.dims == 0 {
            bail!("embedding.dims must be > 0");
        }
        if config.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be > 0");
        }
    }

    Ok(())
}
