//! Embedding similarity scoring.
//!
//! The query and every document are embedded with the same [`Embedder`].
//! Document vectors depend only on the corpus, so they can be kept between
//! queries, keyed by the corpus fingerprint. Scores are identical with and
//! without the cache.

use async_trait::async_trait;
use shieldchat_core::config::Similarity;
use shieldchat_core::error::{Result, ShieldChatError};
use shieldchat_core::traits::{Embedder, Scorer};
use shieldchat_core::types::Corpus;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::similarity;

type DocVectors = Arc<Vec<Vec<f32>>>;

pub struct EmbeddingScorer {
    name: String,
    embedder: Arc<dyn Embedder>,
    similarity: Similarity,
    /// (corpus fingerprint, document vectors). `None` disables caching.
    cache: Option<Mutex<Option<(u64, DocVectors)>>>,
}

impl EmbeddingScorer {
    pub fn new(embedder: Arc<dyn Embedder>, similarity: Similarity) -> Self {
        Self {
            name: format!("embedding:{}", embedder.name()),
            embedder,
            similarity,
            cache: Some(Mutex::new(None)),
        }
    }

    /// Re-embed the whole corpus on every query.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    async fn embed_corpus(&self, corpus: &Corpus) -> Result<DocVectors> {
        let texts: Vec<String> = corpus.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(ShieldChatError::Embedding(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(Arc::new(vectors))
    }

    async fn document_vectors(&self, corpus: &Corpus) -> Result<DocVectors> {
        let Some(cache) = &self.cache else {
            return self.embed_corpus(corpus).await;
        };

        let mut slot = cache.lock().await;
        if let Some((fingerprint, vectors)) = slot.as_ref() {
            if *fingerprint == corpus.fingerprint() {
                return Ok(vectors.clone());
            }
        }
        let vectors = self.embed_corpus(corpus).await?;
        tracing::debug!("Cached {} document vectors ({})", vectors.len(), self.name);
        *slot = Some((corpus.fingerprint(), vectors.clone()));
        Ok(vectors)
    }
}

#[async_trait]
impl Scorer for EmbeddingScorer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn score(&self, query: &str, corpus: &Corpus) -> Result<Vec<f32>> {
        let query_vec = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ShieldChatError::Embedding("no vector returned for query".into()))?;

        let doc_vecs = self.document_vectors(corpus).await?;

        if let Some(bad) = doc_vecs.iter().find(|v| v.len() != query_vec.len()) {
            return Err(ShieldChatError::Embedding(format!(
                "dimension mismatch: query has {}, document has {}",
                query_vec.len(),
                bad.len()
            )));
        }

        Ok(doc_vecs
            .iter()
            .map(|v| similarity::compute(self.similarity, &query_vec, v))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shieldchat_core::types::Document;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Two-dimensional toy embedder: counts of "drone" and "radar".
    struct CountingEmbedder {
        calls: AtomicUsize,
        texts_seen: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                texts_seen: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn name(&self) -> &str {
            "toy"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![t.matches("drone").count() as f32, t.matches("radar").count() as f32]
                })
                .collect())
        }
    }

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Document::new("drone drone"),
            Document::new("radar"),
            Document::new("drone radar"),
        ])
    }

    #[tokio::test]
    async fn test_dot_scores() {
        let scorer = EmbeddingScorer::new(Arc::new(CountingEmbedder::new()), Similarity::Dot);
        let scores = scorer.score("drone", &corpus()).await.unwrap();
        assert_eq!(scores, vec![2.0, 0.0, 1.0]);
        assert!(scorer.admits(0.0));
        assert!(scorer.admits(-1.0));
        assert_eq!(scorer.name(), "embedding:toy");
    }

    #[tokio::test]
    async fn test_cosine_scores() {
        let scorer = EmbeddingScorer::new(Arc::new(CountingEmbedder::new()), Similarity::Cosine);
        let scores = scorer.score("drone", &corpus()).await.unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-6);
        assert!(scores[1].abs() < 1e-6);
        assert!((scores[2] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_cache_reuses_document_vectors() {
        let embedder = Arc::new(CountingEmbedder::new());
        let scorer = EmbeddingScorer::new(embedder.clone(), Similarity::Dot);
        let corpus = corpus();

        let first = scorer.score("drone", &corpus).await.unwrap();
        let second = scorer.score("drone", &corpus).await.unwrap();
        assert_eq!(first, second);
        // 1 corpus batch + 2 query embeddings
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
        assert_eq!(embedder.texts_seen.load(Ordering::SeqCst), 3 + 2);
    }

    #[tokio::test]
    async fn test_cache_invalidated_by_new_corpus() {
        let embedder = Arc::new(CountingEmbedder::new());
        let scorer = EmbeddingScorer::new(embedder.clone(), Similarity::Dot);

        scorer.score("drone", &corpus()).await.unwrap();
        let other = Corpus::new(vec![Document::new("radar radar")]);
        let scores = scorer.score("radar", &other).await.unwrap();
        assert_eq!(scores, vec![2.0]);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_uncached_matches_cached() {
        let cached = EmbeddingScorer::new(Arc::new(CountingEmbedder::new()), Similarity::Cosine);
        let uncached = EmbeddingScorer::new(Arc::new(CountingEmbedder::new()), Similarity::Cosine)
            .without_cache();
        let corpus = corpus();
        for query in ["drone", "radar", "drone radar radar"] {
            let a = cached.score(query, &corpus).await.unwrap();
            let b = uncached.score(query, &corpus).await.unwrap();
            assert_eq!(a, b);
        }
    }

    #[tokio::test]
    async fn test_embedder_failure_propagates() {
        struct Broken;

        #[async_trait]
        impl Embedder for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
                Err(ShieldChatError::Embedding("service down".into()))
            }
        }

        let scorer = EmbeddingScorer::new(Arc::new(Broken), Similarity::Dot);
        let err = scorer.score("drone", &corpus()).await.unwrap_err();
        assert!(matches!(err, ShieldChatError::Embedding(_)));
    }
}
