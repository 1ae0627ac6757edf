//! Unified OpenAI-compatible chat provider.
//!
//! One struct handles chat completions for every OpenAI-compatible API.
//! Providers differ only by endpoint URL, auth style, and API key.

use async_trait::async_trait;
use serde_json::{Value, json};
use shieldchat_core::error::{Result, ShieldChatError};
use shieldchat_core::traits::provider::{GenerateParams, Provider};
use shieldchat_core::types::{Message, ProviderResponse, Usage};

use crate::Endpoint;

/// A chat provider that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    endpoint: Endpoint,
    /// Path for chat completions (e.g., "/chat/completions").
    chat_path: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(endpoint: Endpoint, chat_path: &str, client: reqwest::Client) -> Self {
        Self {
            endpoint,
            chat_path: chat_path.to_string(),
            client,
        }
    }

    fn url(&self) -> String {
        format!("{}{}", self.endpoint.base_url, self.chat_path)
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.endpoint.name
    }

    fn has_credentials(&self) -> bool {
        self.endpoint.has_credentials()
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<ProviderResponse> {
        if !self.has_credentials() {
            return Err(ShieldChatError::ApiKeyMissing(self.endpoint.name.clone()));
        }

        let body = json!({
            "model": params.model,
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let url = self.url();
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let req = self.endpoint.apply_auth(req);

        tracing::debug!(
            "{} chat request: model={}, {} messages",
            self.endpoint.name,
            params.model,
            messages.len()
        );

        let resp = req.send().await.map_err(|e| {
            ShieldChatError::Http(format!(
                "{} connection failed ({}): {}",
                self.endpoint.name, url, e
            ))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ShieldChatError::Provider(format!(
                "{} API error {}: {}",
                self.endpoint.name, status, text
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| ShieldChatError::Http(e.to_string()))?;

        parse_chat_response(&json)
    }
}

/// Parse a standard OpenAI chat-completions body.
///
/// A body without `choices[0].message.content` text is an error: callers
/// treat the completion text as the answer verbatim.
pub fn parse_chat_response(json: &Value) -> Result<ProviderResponse> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| ShieldChatError::Provider("No choices in response".into()))?;

    let content = choice["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| ShieldChatError::Provider("No content in response".into()))?;

    let usage = json["usage"].as_object().map(|u| Usage {
        prompt_tokens: u.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
        completion_tokens: u
            .get("completion_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32,
        total_tokens: u.get("total_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
    });

    Ok(ProviderResponse {
        content: Some(content),
        finish_reason: choice["finish_reason"].as_str().map(String::from),
        usage,
    })
}
