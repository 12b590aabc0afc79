
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::embeddings::chunking::{ChunkingConfig, chunk_text};
use crate::embeddings::EmbeddingProvider;
use crate::store::{ChunkMetadata, IndexStore};

/// One scoped search result, ascending-distance order among same-document
/// matches
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub document_id: String,
    pub text: String,
    pub distance: f32,
}

/// Orchestrates chunking, embedding, and the index store to provide
/// per-document ingestion and document-scoped semantic search
pub struct RetrievalService {
    store: Arc<IndexStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunking: ChunkingConfig,
    oversample_factor: usize,
}

impl RetrievalService {
    #[inline]
    pub fn new(
        store: Arc<IndexStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunking: ChunkingConfig,
        search: &SearchConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            chunking,
            oversample_factor: search.oversample_factor,
        }
    }

    #[inline]
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Chunk, embed, and index `raw_text` under `document_id`, persisting
    /// the store. Returns the number of chunks ingested.
    ///
    /// Text that yields no chunks is a no-op returning 0; whether that is
    /// an error is the caller's decision. On any failure nothing is
    /// committed, in memory or on disk.
    #[inline]
    pub async fn ingest(&self, document_id: &str, raw_text: &str) -> Result<usize> {
        let chunks = chunk_text(raw_text, &self.chunking)
            .with_context(|| format!("Failed to chunk document {document_id}"))?;

        if chunks.is_empty() {
            info!("Document {} produced no chunks, nothing to index", document_id);
            return Ok(0);
        }

        debug!("Embedding {} chunks for document {}", chunks.len(), document_id);
        let vectors = self
            .embedder
            .embed(&chunks)
            .await
            .with_context(|| format!("Failed to embed chunks for document {document_id}"))?;

        if vectors.len() != chunks.len() {
            return Err(anyhow::anyhow!(
                "Embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            ));
        }

        let records: Vec<ChunkMetadata> = chunks
            .iter()
            .map(|chunk| ChunkMetadata {
                document_id: document_id.to_string(),
                text: chunk.clone(),
            })
            .collect();

        self.store
            .append_batch(&vectors, records)
            .with_context(|| format!("Failed to commit batch for document {document_id}"))?;

        info!("Ingested {} chunks for document {}", chunks.len(), document_id);
        Ok(chunks.len())
    }

    /// Semantic search restricted to a single document.
    ///
    /// The index probe is widened to `top_k * oversample_factor` candidates
    /// because the index itself has no notion of document scoping; the walk
    /// keeps same-document matches in ascending-distance order until
    /// `top_k` are collected or the pool is exhausted. Fewer (or zero)
    /// results is a normal outcome: when the widened pool is dominated by
    /// other documents' neighbors, a query can starve. The oversample
    /// factor is a tunable heuristic, not a guarantee.
    #[inline]
    pub async fn search(
        &self,
        document_id: &str,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query = [query_text.to_string()];
        let mut query_vectors = self
            .embedder
            .embed(&query)
            .await
            .context("Failed to embed query")?;
        let query_vector = query_vectors
            .pop()
            .context("Embedding provider returned no vector for the query")?;

        let pool_size = top_k.saturating_mul(self.oversample_factor);
        let candidates = self
            .store
            .search(&query_vector, pool_size)
            .context("Index search failed")?;

        let results: Vec<ScoredChunk> = candidates
            .into_iter()
            .filter(|hit| hit.metadata.document_id == document_id)
            .take(top_k)
            .map(|hit| ScoredChunk {
                document_id: hit.metadata.document_id,
                text: hit.metadata.text,
                distance: hit.distance,
            })
            .collect();

        debug!(
            "Scoped search for document {} returned {} of up to {} results",
            document_id,
            results.len(),
            top_k
        );
        Ok(results)
    }
}
