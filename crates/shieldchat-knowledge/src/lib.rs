//! # ShieldChat Knowledge
//!
//! Corpus ingestion and top-k retrieval.
//!
//! ## Design
//! - **Linear scan**: every query scores every document; no index
//! - **Pluggable scoring**: keyword overlap, embedding similarity, or
//!   SHA-256 pseudo-embeddings, chosen once at startup
//! - **Read-only corpus**: loaded once, shared behind `Arc`
//!
//! ## How it works
//! ```text
//! "What does RfPatrol detect?"
//!   ↓
//! Retriever.retrieve(query, 4)
//!   ↓ Scorer over every document, stable sort desc
//! Top 4 documents
//!   ↓
//! Answer composer builds the context block
//! ```

pub mod corpus;
pub mod retriever;
pub mod scoring;

use shieldchat_core::config::{RetrievalConfig, Strategy};
use shieldchat_core::traits::{Embedder, Scorer};
use std::sync::Arc;

pub use corpus::{LoadOutcome, load_corpus, parse_corpus};
pub use retriever::{DEFAULT_TOP_K, Retriever};

/// Build the configured scoring strategy.
///
/// `embedder` is only used by [`Strategy::Embedding`]; it is ignored for the
/// other strategies and may be `None` for them. The embedding strategy
/// without an embedder falls back to keyword scoring.
pub fn build_scorer(
    config: &RetrievalConfig,
    embedder: Option<Arc<dyn Embedder>>,
) -> Arc<dyn Scorer> {
    match config.strategy {
        Strategy::Keyword => Arc::new(scoring::KeywordScorer::new()),
        Strategy::Hashed => {
            let scorer = scoring::hashed::hashed_scorer();
            if config.cache_embeddings {
                Arc::new(scorer)
            } else {
                Arc::new(scorer.without_cache())
            }
        }
        Strategy::Embedding => {
            let Some(embedder) = embedder else {
                tracing::warn!("⚠️ No embeddings endpoint; falling back to keyword retrieval");
                return Arc::new(scoring::KeywordScorer::new());
            };
            let scorer = scoring::EmbeddingScorer::new(embedder, config.similarity);
            if config.cache_embeddings {
                Arc::new(scorer)
            } else {
                Arc::new(scorer.without_cache())
            }
        }
    }
}
