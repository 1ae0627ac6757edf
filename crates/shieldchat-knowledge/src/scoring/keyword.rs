//! Keyword overlap scoring.

use async_trait::async_trait;
use shieldchat_core::error::Result;
use shieldchat_core::traits::Scorer;
use shieldchat_core::types::Corpus;

/// Tokens this short carry no signal ("a", "of", "uk").
const MIN_TOKEN_LEN: usize = 3;

/// Lowercase ASCII alphanumeric runs of at least three characters.
///
/// Repeated tokens are kept: a word asked about twice counts twice.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() >= MIN_TOKEN_LEN)
        .map(String::from)
        .collect()
}

/// Score = sum over query tokens of the token's non-overlapping substring
/// occurrences in the lowercased document text.
#[derive(Debug, Default)]
pub struct KeywordScorer;

impl KeywordScorer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scorer for KeywordScorer {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn score(&self, query: &str, corpus: &Corpus) -> Result<Vec<f32>> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Ok(vec![0.0; corpus.len()]);
        }

        Ok(corpus
            .iter()
            .map(|doc| {
                let text = doc.text.to_lowercase();
                tokens
                    .iter()
                    .map(|t| text.matches(t.as_str()).count())
                    .sum::<usize>() as f32
            })
            .collect())
    }

    fn admits(&self, score: f32) -> bool {
        score > 0.0
    }
}
