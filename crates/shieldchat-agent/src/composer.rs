//! Answer composer: retrieval → prompt → completion → answer.

use shieldchat_core::config::ShieldChatConfig;
use shieldchat_core::error::ShieldChatError;
use shieldchat_core::traits::Provider;
use shieldchat_core::traits::provider::GenerateParams;
use shieldchat_core::types::{Answer, Document, Message, dedupe_sources};
use shieldchat_knowledge::{DEFAULT_TOP_K, Retriever};
use std::sync::Arc;

/// Context block used when retrieval found nothing.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No relevant data found.";

/// Returned instead of calling the service when no credential is configured.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "⚠️ Completion service API key not set. \
Set `api_key` in ~/.shieldchat/config.toml or export OPENAI_API_KEY.";

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a question.";

/// Characters of raw context shown when the completion call fails.
pub const FALLBACK_EXCERPT_CHARS: usize = 1000;

/// Builds grounded answers from the corpus and the completion service.
pub struct AnswerComposer {
    retriever: Retriever,
    provider: Option<Arc<dyn Provider>>,
    params: GenerateParams,
    system_prompt: String,
    top_k: usize,
}

impl AnswerComposer {
    /// `provider` is `None` when no completion service could be configured;
    /// retrieval still works and answers carry the credential notice.
    pub fn new(retriever: Retriever, provider: Option<Arc<dyn Provider>>) -> Self {
        let defaults = ShieldChatConfig::default();
        Self {
            retriever,
            provider,
            params: GenerateParams::default(),
            system_prompt: defaults.identity.system_prompt,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn from_config(
        config: &ShieldChatConfig,
        retriever: Retriever,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        Self::new(retriever, provider)
            .with_params(GenerateParams {
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            })
            .with_system_prompt(&config.identity.system_prompt)
            .with_top_k(config.retrieval.top_k)
    }

    pub fn with_params(mut self, params: GenerateParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k.max(1);
        self
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Whether a completion call would be attempted.
    pub fn can_complete(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.has_credentials())
    }

    /// Answer one question. Never fails; service problems become text.
    pub async fn answer(&self, query: &str) -> Answer {
        if query.trim().is_empty() {
            return Answer {
                text: EMPTY_QUERY_MESSAGE.into(),
                sources: Vec::new(),
            };
        }

        let hits = self.retriever.retrieve(query, self.top_k).await;
        let sources = dedupe_sources(&hits.documents);
        let context = build_context(&hits.documents);

        let provider = match &self.provider {
            Some(p) if p.has_credentials() => p,
            _ => {
                return Answer {
                    text: MISSING_CREDENTIAL_MESSAGE.into(),
                    sources,
                };
            }
        };

        let messages = [
            Message::system(&self.system_prompt),
            Message::user(&build_user_prompt(&context, query, &sources)),
        ];

        tracing::info!(
            "💬 Asking {} ({} context docs, {} sources)",
            provider.name(),
            hits.len(),
            sources.len()
        );

        let text = match provider.chat(&messages, &self.params).await {
            Ok(resp) => {
                if let Some(usage) = &resp.usage {
                    tracing::debug!(
                        "Completion usage: {} prompt + {} completion = {} tokens",
                        usage.prompt_tokens,
                        usage.completion_tokens,
                        usage.total_tokens
                    );
                }
                if resp.finish_reason.as_deref() == Some("length") {
                    tracing::warn!("⚠️ Answer cut off at max_tokens={}", self.params.max_tokens);
                }
                match resp.content {
                    Some(content) => content,
                    None => fallback_text(
                        &ShieldChatError::Provider("empty completion".into()),
                        &context,
                    ),
                }
            }
            Err(ShieldChatError::ApiKeyMissing(_)) => MISSING_CREDENTIAL_MESSAGE.into(),
            Err(e) if e.is_service_error() => {
                tracing::warn!("⚠️ Completion failed, using extractive fallback: {e}");
                fallback_text(&e, &context)
            }
            Err(e) => {
                tracing::error!("❌ Completion could not be attempted: {e}");
                fallback_text(&e, &context)
            }
        };

        Answer { text, sources }
    }
}

/// Retrieved texts joined by blank lines, or the placeholder.
pub fn build_context(documents: &[Document]) -> String {
    if documents.is_empty() {
        return NO_CONTEXT_PLACEHOLDER.to_string();
    }
    documents
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_user_prompt(context: &str, query: &str, sources: &[String]) -> String {
    let mut prompt = format!("CONTEXT:\n{context}\n\n");
    if !sources.is_empty() {
        prompt.push_str("SOURCES:\n");
        for url in sources {
            prompt.push_str(&format!("- {url}\n"));
        }
        prompt.push('\n');
    }
    prompt.push_str(&format!("QUESTION: {query}\n\nAnswer:"));
    prompt
}

/// Error notice followed by the head of the raw context.
pub fn fallback_text(err: &ShieldChatError, context: &str) -> String {
    let excerpt: String = context.chars().take(FALLBACK_EXCERPT_CHARS).collect();
    let excerpt = if excerpt.trim().is_empty() {
        "No local data.".to_string()
    } else {
        excerpt
    };
    format!("⚠️ Completion service error: {err}\n\nExtractive fallback:\n\n{excerpt}")
}
