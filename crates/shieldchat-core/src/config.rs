//! ShieldChat configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, ShieldChatError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldChatConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

fn default_provider() -> String { "openai".into() }
fn default_model() -> String { "gpt-4o".into() }
fn default_temperature() -> f32 { 0.3 }
fn default_max_tokens() -> u32 { 600 }
fn default_request_timeout() -> u64 { 60 }

impl Default for ShieldChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            corpus: CorpusConfig::default(),
            retrieval: RetrievalConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl ShieldChatConfig {
    /// Load config from the default path (~/.shieldchat/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ShieldChatError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ShieldChatError::Config(format!("Failed to parse config: {e}")))
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ShieldChat home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".shieldchat")
    }
}

/// Where the document collection lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_path")]
    pub path: String,
}

fn default_corpus_path() -> String { "droneshield_parsed_data.json.txt".into() }

impl Default for CorpusConfig {
    fn default() -> Self {
        Self { path: default_corpus_path() }
    }
}

/// Scoring strategy, fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Query token occurrence counting.
    Keyword,
    /// Dense vectors from an embeddings endpoint.
    Embedding,
    /// SHA-256 pseudo-embedding. No semantic signal.
    Hashed,
}

impl FromStr for Strategy {
    type Err = ShieldChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "embedding" => Ok(Self::Embedding),
            "hashed" | "hash" => Ok(Self::Hashed),
            other => Err(ShieldChatError::Config(format!(
                "Unknown retrieval strategy '{other}' (expected keyword, embedding or hashed)"
            ))),
        }
    }
}

/// Vector similarity convention for embedding strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Similarity {
    /// Raw dot product. Equals cosine when the embedder returns unit vectors.
    Dot,
    /// Dot product divided by both norms.
    Cosine,
}

/// Retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_similarity")]
    pub similarity: Similarity,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Base URL for the embeddings API. Empty means: same as the provider.
    #[serde(default)]
    pub embedding_endpoint: String,
    #[serde(default = "bool_true")]
    pub cache_embeddings: bool,
}

fn bool_true() -> bool { true }
fn default_strategy() -> Strategy { Strategy::Keyword }
fn default_top_k() -> usize { 4 }
fn default_similarity() -> Similarity { Similarity::Dot }
fn default_embedding_model() -> String { "text-embedding-3-small".into() }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            top_k: default_top_k(),
            similarity: default_similarity(),
            embedding_model: default_embedding_model(),
            embedding_endpoint: String::new(),
            cache_embeddings: true,
        }
    }
}

/// Assistant identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are the DroneShield AI assistant.
Use the provided context where relevant. If the answer is not in the context,
answer accurately from general verified knowledge and note that it came from outside the dataset.
Always finish with a 'Sources:' section listing relevant links from the context when available.
Keep answers concise, factual, and professional.
";

fn default_system_prompt() -> String { DEFAULT_SYSTEM_PROMPT.into() }

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { system_prompt: default_system_prompt() }
    }
}
