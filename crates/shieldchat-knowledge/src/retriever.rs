//! Top-k retrieval over the in-memory corpus.

use shieldchat_core::traits::Scorer;
use shieldchat_core::types::{Corpus, RetrievalResult, ScoredDocument};
use std::cmp::Ordering;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 4;

/// Scores every document with the injected strategy and keeps the best k.
///
/// Never fails: an empty query, an empty corpus, or a scorer error all
/// produce an empty result.
#[derive(Clone)]
pub struct Retriever {
    corpus: Arc<Corpus>,
    scorer: Arc<dyn Scorer>,
}

impl Retriever {
    pub fn new(corpus: Arc<Corpus>, scorer: Arc<dyn Scorer>) -> Self {
        Self { corpus, scorer }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Best `k` documents for `query`, highest score first.
    pub async fn retrieve(&self, query: &str, k: usize) -> RetrievalResult {
        self.retrieve_scored(query, k).await.into()
    }

    pub async fn retrieve_default(&self, query: &str) -> RetrievalResult {
        self.retrieve(query, DEFAULT_TOP_K).await
    }

    /// Like [`retrieve`](Self::retrieve) but keeps the scores.
    pub async fn retrieve_scored(&self, query: &str, k: usize) -> Vec<ScoredDocument> {
        if query.trim().is_empty() || self.corpus.is_empty() || k == 0 {
            return Vec::new();
        }

        let scores = match self.scorer.score(query, &self.corpus).await {
            Ok(scores) => scores,
            Err(e) => {
                tracing::warn!("⚠️ {} scoring failed: {e}", self.scorer.name());
                return Vec::new();
            }
        };
        if scores.len() != self.corpus.len() {
            tracing::warn!(
                "⚠️ {} returned {} scores for {} documents",
                self.scorer.name(),
                scores.len(),
                self.corpus.len()
            );
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, s)| !s.is_nan() && self.scorer.admits(*s))
            .collect();

        // Stable: equal scores keep corpus order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        tracing::debug!(
            "Retrieved {} of {} documents ({})",
            scored.len(),
            self.corpus.len(),
            self.scorer.name()
        );

        scored
            .into_iter()
            .map(|(idx, score)| ScoredDocument {
                document: self.corpus.documents()[idx].clone(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{KeywordScorer, hashed::hashed_scorer};
    use async_trait::async_trait;
    use shieldchat_core::error::{Result, ShieldChatError};
    use shieldchat_core::types::Document;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Returns preset scores and counts invocations.
    struct FixedScorer {
        scores: Vec<f32>,
        calls: AtomicUsize,
        admit_all: bool,
    }

    impl FixedScorer {
        fn new(scores: Vec<f32>) -> Self {
            Self {
                scores,
                calls: AtomicUsize::new(0),
                admit_all: true,
            }
        }
    }

    #[async_trait]
    impl Scorer for FixedScorer {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn score(&self, _query: &str, _corpus: &Corpus) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(self.scores.clone())
        }

        fn admits(&self, score: f32) -> bool {
            self.admit_all || score > 0.0
        }
    }

    fn docs(texts: &[&str]) -> Arc<Corpus> {
        Arc::new(Corpus::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| Document::new(*t).with_url(format!("https://x/{i}")))
                .collect(),
        ))
    }

    fn texts(result: &RetrievalResult) -> Vec<&str> {
        result.documents.iter().map(|d| d.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_sorted_desc_with_stable_ties() {
        let scorer = Arc::new(FixedScorer::new(vec![0.5, 0.9, 0.5, 0.1, 0.9]));
        let retriever = Retriever::new(docs(&["a", "b", "c", "d", "e"]), scorer);
        let result = retriever.retrieve("query", 4).await;
        assert_eq!(texts(&result), vec!["b", "e", "a", "c"]);
    }

    #[tokio::test]
    async fn test_k_larger_than_corpus_returns_all() {
        let scorer = Arc::new(FixedScorer::new(vec![0.1, -0.2, 0.3]));
        let retriever = Retriever::new(docs(&["a", "b", "c"]), scorer);
        let scored = retriever.retrieve_scored("query", 10).await;
        assert_eq!(scored.len(), 3);
        assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
        // Negative scores are kept when the scorer admits them.
        assert_eq!(scored[2].document.text, "b");
    }

    #[tokio::test]
    async fn test_empty_corpus_skips_scorer() {
        let scorer = Arc::new(FixedScorer::new(vec![]));
        let retriever = Retriever::new(Arc::new(Corpus::empty()), scorer.clone());
        assert!(retriever.retrieve("drones", 4).await.is_empty());
        assert_eq!(scorer.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_query_skips_scorer() {
        let scorer = Arc::new(FixedScorer::new(vec![1.0]));
        let retriever = Retriever::new(docs(&["a"]), scorer.clone());
        assert!(retriever.retrieve("   ", 4).await.is_empty());
        assert!(retriever.retrieve("", 4).await.is_empty());
        assert!(retriever.retrieve("query", 0).await.is_empty());
        assert_eq!(scorer.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unadmitted_scores_dropped() {
        let mut fixed = FixedScorer::new(vec![0.0, 2.0, 0.0, 1.0]);
        fixed.admit_all = false;
        let retriever = Retriever::new(docs(&["a", "b", "c", "d"]), Arc::new(fixed));
        assert_eq!(texts(&retriever.retrieve("q", 4).await), vec!["b", "d"]);
    }

    #[tokio::test]
    async fn test_scorer_error_yields_empty() {
        struct Failing;

        #[async_trait]
        impl Scorer for Failing {
            fn name(&self) -> &str {
                "failing"
            }
            async fn score(&self, _query: &str, _corpus: &Corpus) -> Result<Vec<f32>> {
                Err(ShieldChatError::Embedding("down".into()))
            }
        }

        let retriever = Retriever::new(docs(&["a"]), Arc::new(Failing));
        assert!(retriever.retrieve("query", 4).await.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_score_count_yields_empty() {
        let retriever = Retriever::new(docs(&["a", "b"]), Arc::new(FixedScorer::new(vec![1.0])));
        assert!(retriever.retrieve("query", 4).await.is_empty());
    }

    #[tokio::test]
    async fn test_keyword_retrieval() {
        let corpus = Arc::new(Corpus::new(vec![
            Document::new("Company overview and history"),
            Document::new("DroneGun jams drone control links").with_url("https://x/gun"),
            Document::new("RfPatrol detects drone signals; drone detection is passive")
                .with_url("https://x/rf"),
        ]));
        let retriever = Retriever::new(corpus, Arc::new(KeywordScorer));

        let result = retriever.retrieve_default("drone detection").await;
        assert_eq!(result.len(), 2);
        assert_eq!(result.documents[0].url, "https://x/rf");
        assert_eq!(result.sources(), vec!["https://x/rf", "https://x/gun"]);

        // No token longer than two characters.
        assert!(retriever.retrieve("is it ok", 4).await.is_empty());
    }

    #[tokio::test]
    async fn test_result_bounded_by_k_and_corpus() {
        let corpus = docs(&["drone a", "drone b", "drone c", "drone d", "drone e", "drone f"]);
        let keyword = Retriever::new(corpus.clone(), Arc::new(KeywordScorer));
        let hashed = Retriever::new(corpus.clone(), Arc::new(hashed_scorer()));
        for k in [1, 4, 6, 20] {
            for retriever in [&keyword, &hashed] {
                let scored = retriever.retrieve_scored("drone", k).await;
                assert!(scored.len() <= k.min(corpus.len()));
                assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
            }
        }
        // Embedding-style strategies keep every document.
        assert_eq!(hashed.retrieve_scored("drone", 20).await.len(), 6);
        assert_eq!(keyword.scorer_name(), "keyword");
    }
}
