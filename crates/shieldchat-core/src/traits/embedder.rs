use async_trait::async_trait;

use crate::error::Result;

/// Maps texts to fixed-length dense vectors.
///
/// Implementations must return exactly one vector per input, in input
/// order, all of the same length.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
