//! Trait seams between crates.

pub mod embedder;
pub mod provider;
pub mod scorer;

pub use embedder::Embedder;
pub use provider::Provider;
pub use scorer::Scorer;
