//! # ShieldChat Providers
//!
//! Clients for the external services behind an answer: the chat-completion
//! endpoint and, for the embedding retrieval strategy, the embeddings
//! endpoint. Both speak the OpenAI-compatible dialect and share one
//! resolved [`Endpoint`].

pub mod embeddings;
pub mod openai_compatible;
pub mod provider_registry;

use shieldchat_core::config::ShieldChatConfig;
use shieldchat_core::error::{Result, ShieldChatError};

use provider_registry::{AuthStyle, ProviderConfig};

/// A resolved service endpoint: where to send requests and how to sign them.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    pub auth_style: AuthStyle,
}

impl Endpoint {
    /// Resolve against a registry entry.
    ///
    /// Resolution order:
    /// - API key: `config.api_key` > registry env vars > empty
    /// - Base URL: registry base URL env override > registry default. Only
    ///   host-style overrides (OLLAMA_HOST) get `/v1` appended.
    pub fn from_registry(registry: &ProviderConfig, config: &ShieldChatConfig) -> Self {
        Self::resolve_with(registry, config, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        registry: &ProviderConfig,
        config: &ShieldChatConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| env(key).filter(|v| !v.trim().is_empty()))
                .unwrap_or_default()
        };

        let base_url = registry
            .base_url_env
            .and_then(|env_key| env(env_key))
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .map(|val| {
                if registry.base_url_env_is_host && !val.ends_with("/v1") {
                    format!("{val}/v1")
                } else {
                    val
                }
            })
            .unwrap_or_else(|| registry.base_url.to_string());

        Self {
            name: registry.name.to_string(),
            api_key,
            base_url,
            auth_style: registry.auth_style,
        }
    }

    /// Endpoint for "custom:https://my-server.com/v1".
    pub fn custom(spec: &str, config: &ShieldChatConfig) -> Self {
        Self::custom_with(spec, config, |key| std::env::var(key).ok())
    }

    fn custom_with(
        spec: &str,
        config: &ShieldChatConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let base_url = spec
            .strip_prefix("custom:")
            .unwrap_or(spec)
            .trim_end_matches('/')
            .to_string();

        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            env("CUSTOM_API_KEY").unwrap_or_default()
        };

        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        Self {
            name: "custom".to_string(),
            base_url,
            api_key,
            auth_style,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.auth_style == AuthStyle::None || !self.api_key.is_empty()
    }

    /// Attach the auth header, if any.
    pub fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }
}

/// Resolve the configured provider's endpoint and its API paths.
fn resolve(config: &ShieldChatConfig) -> Result<(Endpoint, &'static str, &'static str)> {
    let name = config.provider.as_str();
    if name.starts_with("custom:") {
        return Ok((Endpoint::custom(name, config), "/chat/completions", "/embeddings"));
    }
    let registry = provider_registry::get_provider_config(name)
        .ok_or_else(|| ShieldChatError::ProviderNotFound(name.into()))?;
    Ok((
        Endpoint::from_registry(registry, config),
        registry.chat_path,
        registry.embeddings_path,
    ))
}

/// Shared HTTP client with the configured request timeout.
pub fn http_client(config: &ShieldChatConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("ShieldChat/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| ShieldChatError::Http(format!("Failed to build HTTP client: {e}")))
}

/// Create the chat-completion provider from configuration.
pub fn create_provider(
    config: &ShieldChatConfig,
    client: reqwest::Client,
) -> Result<openai_compatible::OpenAiCompatibleProvider> {
    let (endpoint, chat_path, _) = resolve(config)?;
    Ok(openai_compatible::OpenAiCompatibleProvider::new(endpoint, chat_path, client))
}

/// Create the embeddings client for the `embedding` retrieval strategy.
///
/// Uses the provider's endpoint unless `retrieval.embedding_endpoint` overrides
/// the base URL.
pub fn create_embedder(
    config: &ShieldChatConfig,
    client: reqwest::Client,
) -> Result<embeddings::OpenAiEmbedder> {
    let (mut endpoint, _, embeddings_path) = resolve(config)?;
    let override_url = config.retrieval.embedding_endpoint.trim();
    if !override_url.is_empty() {
        endpoint.base_url = override_url.trim_end_matches('/').to_string();
    }
    Ok(embeddings::OpenAiEmbedder::new(
        endpoint,
        embeddings_path,
        &config.retrieval.embedding_model,
        client,
    ))
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::all_provider_names();
    names.push("custom");
    names
}
