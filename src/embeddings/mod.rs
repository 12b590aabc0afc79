// Embeddings module
// Sentence-aware chunking and the embedding provider seam

pub mod chunking;
pub mod ollama;

pub use chunking::{ChunkingConfig, chunk_text, split_sentences};
pub use ollama::OllamaClient;

use anyhow::Result;
use async_trait::async_trait;

/// Maps batches of texts to fixed-dimension vectors.
///
/// Implementations must return one vector per input text, in input order,
/// with a stable dimension for the process lifetime. The retrieval service
/// depends on this trait rather than a concrete client so tests can inject
/// a deterministic stub.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `texts`, one vector per text, same order as the input
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Output vector width, fixed per deployment
    fn dimension(&self) -> usize;
}
