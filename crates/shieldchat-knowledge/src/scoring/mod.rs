//! Scoring strategies.
//!
//! All three implement [`Scorer`](shieldchat_core::traits::Scorer) and are
//! picked once, when the retriever is built:
//!
//! | Strategy  | Signal                              | Zero scores |
//! |-----------|-------------------------------------|-------------|
//! | keyword   | query token occurrence counts       | dropped     |
//! | embedding | dense vectors from an embedder      | kept        |
//! | hashed    | SHA-256 pseudo-vectors (no meaning) | kept        |

pub mod embedding;
pub mod hashed;
pub mod keyword;
pub mod similarity;

pub use embedding::EmbeddingScorer;
pub use hashed::HashEmbedder;
pub use keyword::KeywordScorer;
