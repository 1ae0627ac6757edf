//! Data model shared across crates: documents, the corpus, retrieval
//! results, answers, and the chat message shapes sent to providers.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// One retrievable unit of text plus optional metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Document {
    pub text: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: String::new(),
            url: String::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Ordered, read-only collection of documents.
///
/// Order is insertion order from the source and only matters as a
/// tie-break between equal scores. The fingerprint identifies the
/// content so that derived data (document vectors) can be cached per
/// corpus version.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    fingerprint: u64,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        documents.len().hash(&mut hasher);
        for doc in &documents {
            doc.text.hash(&mut hasher);
        }
        Self {
            fingerprint: hasher.finish(),
            documents,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }
}

/// A document paired with its score for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Up to k documents, highest score first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    pub documents: Vec<Document>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Non-empty URLs in first-seen order, duplicates removed.
    pub fn sources(&self) -> Vec<String> {
        dedupe_sources(&self.documents)
    }
}

impl From<Vec<ScoredDocument>> for RetrievalResult {
    fn from(scored: Vec<ScoredDocument>) -> Self {
        Self {
            documents: scored.into_iter().map(|s| s.document).collect(),
        }
    }
}

/// Final reply for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
}

/// Collect document URLs, skipping empty ones and keeping only the first
/// occurrence of each.
pub fn dedupe_sources(documents: &[Document]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    documents
        .iter()
        .filter(|d| !d.url.is_empty())
        .filter(|d| seen.insert(d.url.as_str()))
        .map(|d| d.url.clone())
        .collect()
}

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Chat message sent to a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }
}

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a completion provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl ProviderResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: Some("stop".into()),
            usage: None,
        }
    }
}
