//! Completion provider trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Message, ProviderResponse};

/// Sampling parameters for one completion request.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            temperature: 0.3,
            max_tokens: 600,
        }
    }
}

/// A chat-completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the provider has what it needs to authenticate. Callers
    /// check this before `chat` so a missing key never reaches the network.
    fn has_credentials(&self) -> bool;

    async fn chat(&self, messages: &[Message], params: &GenerateParams) -> Result<ProviderResponse>;
}
