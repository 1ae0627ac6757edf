//! Relevance scoring strategy.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Corpus;

/// Scores every corpus document against a query.
///
/// Strategies are chosen when the retriever is built; the retriever never
/// branches on which one it holds.
#[async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &str;

    /// One score per document, in corpus order.
    async fn score(&self, query: &str, corpus: &Corpus) -> Result<Vec<f32>>;

    /// Whether a document with this score may appear in results.
    fn admits(&self, _score: f32) -> bool {
        true
    }
}
