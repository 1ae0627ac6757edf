//! OpenAI-compatible embeddings client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shieldchat_core::error::{Result, ShieldChatError};
use shieldchat_core::traits::Embedder;

use crate::Endpoint;

/// Maximum bytes of one input sent to the embeddings API. Long corpus
/// entries would otherwise exceed the model's context window.
const MAX_EMBED_CHARS: usize = 3_000;

const BATCH_SIZE: usize = 64;

/// Truncate `text` to at most `MAX_EMBED_CHARS` bytes on a char boundary.
fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

pub struct OpenAiEmbedder {
    endpoint: Endpoint,
    embeddings_path: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(
        endpoint: Endpoint,
        embeddings_path: &str,
        model: &str,
        client: reqwest::Client,
    ) -> Self {
        Self {
            endpoint,
            embeddings_path: embeddings_path.to_string(),
            model: model.to_string(),
            client,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if !self.endpoint.has_credentials() {
            return Err(ShieldChatError::ApiKeyMissing(self.endpoint.name.clone()));
        }

        let url = format!("{}{}", self.endpoint.base_url, self.embeddings_path);
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let req = EmbedRequest {
                model: &self.model,
                input: chunk.iter().map(|t| truncate_for_embedding(t)).collect(),
            };

            let resp = self
                .endpoint
                .apply_auth(self.client.post(&url).json(&req))
                .send()
                .await
                .map_err(|e| ShieldChatError::Embedding(format!("request to {url} failed: {e}")))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(ShieldChatError::Embedding(format!(
                    "embeddings API returned {status}: {body}"
                )));
            }

            let body: EmbedResponse = resp
                .json()
                .await
                .map_err(|e| ShieldChatError::Embedding(format!("bad embeddings response: {e}")))?;

            if body.data.len() != chunk.len() {
                return Err(ShieldChatError::Embedding(format!(
                    "expected {} embeddings, got {}",
                    chunk.len(),
                    body.data.len()
                )));
            }
            all_embeddings.extend(body.data.into_iter().map(|d| d.embedding));
        }

        tracing::debug!("Embedded {} texts with {}", texts.len(), self.model);
        Ok(all_embeddings)
    }
}
