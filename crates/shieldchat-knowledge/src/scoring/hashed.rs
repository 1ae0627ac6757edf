//! Hashed pseudo-embeddings.
//!
//! A SHA-256 digest of the full text, each byte rescaled to `[0, 1]`.
//! Identical texts get identical vectors and nothing else is meaningful:
//! this is a degraded mode for deployments without an embedding model.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shieldchat_core::config::Similarity;
use shieldchat_core::error::Result;
use shieldchat_core::traits::Embedder;
use std::sync::Arc;

use super::EmbeddingScorer;

pub const HASH_DIMENSIONS: usize = 32;

pub fn hash_embedding(text: &str) -> Vec<f32> {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|b| *b as f32 / 255.0)
        .collect()
}

#[derive(Debug, Default)]
pub struct HashEmbedder;

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "sha256"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| hash_embedding(t)).collect())
    }
}

/// The hashed strategy: SHA-256 vectors compared by cosine similarity.
pub fn hashed_scorer() -> EmbeddingScorer {
    EmbeddingScorer::new(Arc::new(HashEmbedder), Similarity::Cosine).with_name("hashed")
}
