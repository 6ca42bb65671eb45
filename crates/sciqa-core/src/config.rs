//! Configuration loader and path helpers.
//!
//! Figment merges `config.toml`, `config.<env>.toml` and `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_RETRIEVAL__TOP_K`) over the serde
//! defaults of [`Settings`].

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};

/// Bounds applied to the configured retrieval depth.
pub const MIN_TOP_K: usize = 3;
pub const MAX_TOP_K: usize = 10;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    /// Typed view of the whole configuration, validated.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub papers_dir: String,
    pub lancedb_dir: String,
    pub table: String,
    pub qas_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            papers_dir: "data/papers".to_string(),
            lancedb_dir: "vectorstore".to_string(),
            table: "scientific".to_string(),
            qas_path: "data/qas.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Directory holding `config.json`, `tokenizer.json` and the weights.
    pub model_dir: Option<String>,
    pub batch_size: usize,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: None, batch_size: 32, max_len: 256 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub model: String,
    /// Used once when `model` reports quota exhaustion.
    pub fallback_model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-pro".to_string(),
            fallback_model: "gemini-1.5-flash".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let c = &self.chunking;
        if c.target_chars == 0 {
            return Err(Error::InvalidConfig("chunking.target_chars must be > 0".into()));
        }
        if c.overlap_chars >= c.target_chars {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap_chars ({}) must be smaller than target_chars ({})",
                c.overlap_chars, c.target_chars
            )));
        }
        if !(c.min_fill_ratio > 0.0 && c.min_fill_ratio <= 1.0) {
            return Err(Error::InvalidConfig("chunking.min_fill_ratio must be in (0, 1]".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be > 0".into()));
        }
        if self.data.table.trim().is_empty() {
            return Err(Error::InvalidConfig("data.table must not be empty".into()));
        }
        Ok(())
    }

    pub fn top_k(&self) -> usize {
        clamp_top_k(self.retrieval.top_k)
    }

    pub fn papers_dir(&self) -> PathBuf {
        expand_path(&self.data.papers_dir)
    }

    pub fn lancedb_dir(&self) -> PathBuf {
        expand_path(&self.data.lancedb_dir)
    }

    pub fn model_dir(&self) -> Option<PathBuf> {
        self.embedding.model_dir.as_deref().map(expand_path)
    }

    /// API key from `generation.api_key`, else `GEMINI_API_KEY`.
    pub fn gemini_api_key(&self) -> Result<String> {
        self.generation
            .api_key
            .clone()
            .or_else(|| env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "Missing GEMINI_API_KEY in environment variables or .env file".into(),
                )
            })
    }
}

pub fn clamp_top_k(k: usize) -> usize {
    k.clamp(MIN_TOP_K, MAX_TOP_K)
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
