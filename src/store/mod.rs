// Index store module
// Owns the vector index + metadata store pair and their on-disk artifacts


pub mod metadata;
pub mod vector_index;

pub use metadata::{ChunkMetadata, MetadataStore};
pub use vector_index::VectorIndex;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

const INDEX_FILE: &str = "index.bin";
const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid vector dimension: {0} (must be at least 1)")]
    InvalidDimension(usize),
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Metadata position {position} out of range (store holds {len} records)")]
    OutOfRange { position: usize, len: usize },
    #[error("Batch count mismatch: {vectors} vectors but {records} metadata records")]
    CountMismatch { vectors: usize, records: usize },
    #[error("Store corrupted: {0}")]
    Corrupted(String),
    #[error("Store lock poisoned by a panicked writer")]
    LockPoisoned,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Metadata serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One scoped-search candidate: the metadata record at `position` and its
/// squared Euclidean distance to the query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
    pub metadata: ChunkMetadata,
}

struct StoreInner {
    index: VectorIndex,
    metadata: MetadataStore,
}

/// Durable union of the vector index and metadata store.
///
/// The pair lives behind one lock: writers hold it across add, append, and
/// persist so the positional correspondence `vector[i] <-> metadata[i]`
/// always holds for readers, and searches resolve candidates against the
/// same snapshot they probed. Records only ever accumulate; there is no
/// delete or update.
///
/// Persistence is a full-store rewrite per batch: each artifact is written
/// to a temporary sibling and atomically renamed over the live file, so a
/// crash mid-write never leaves a half-written artifact behind.
pub struct IndexStore {
    dir: PathBuf,
    inner: RwLock<StoreInner>,
}

impl IndexStore {
    /// Open the store at `dir`, loading both artifacts if present or
    /// initializing an empty store with the configured dimension.
    ///
    /// A half-present artifact pair, mismatched record counts, or a
    /// dimension that disagrees with the configuration all refuse to load:
    /// serving search results from an inconsistent store would silently
    /// return wrong answers.
    #[inline]
    pub fn open<P: AsRef<Path>>(dir: P, dimension: usize) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let index_path = dir.join(INDEX_FILE);
        let metadata_path = dir.join(METADATA_FILE);

        let inner = match (index_path.exists(), metadata_path.exists()) {
            (true, true) => {
                let index = VectorIndex::load(&index_path)?;
                let metadata = MetadataStore::load(&metadata_path)?;

                if index.dimension() != dimension {
                    return Err(StoreError::DimensionMismatch {
                        expected: dimension,
                        actual: index.dimension(),
                    });
                }
                if index.len() != metadata.len() {
                    return Err(StoreError::Corrupted(format!(
                        "index holds {} vectors but metadata holds {} records",
                        index.len(),
                        metadata.len()
                    )));
                }

                info!(
                    "Loaded index store from {} ({} records, dimension {})",
                    dir.display(),
                    index.len(),
                    dimension
                );
                StoreInner { index, metadata }
            }
            (false, false) => {
                info!(
                    "Initializing empty index store at {} (dimension {})",
                    dir.display(),
                    dimension
                );
                StoreInner {
                    index: VectorIndex::new(dimension)?,
                    metadata: MetadataStore::new(),
                }
            }
            (index_present, _) => {
                let missing = if index_present {
                    METADATA_FILE
                } else {
                    INDEX_FILE
                };
                return Err(StoreError::Corrupted(format!(
                    "store at {} is missing its {} artifact",
                    dir.display(),
                    missing
                )));
            }
        };

        Ok(Self {
            dir,
            inner: RwLock::new(inner),
        })
    }

    #[inline]
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    #[inline]
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    #[inline]
    pub fn dimension(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.index.dimension())
    }

    /// Number of stored records
    #[inline]
    pub fn len(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.index.len())
    }

    #[inline]
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Chunk counts per document id
    #[inline]
    pub fn document_counts(&self) -> Result<Vec<(String, usize)>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.metadata.document_counts())
    }

    /// Append one ingestion batch: vectors and their metadata records, in
    /// matching count and order, then persist the full store.
    ///
    /// The write lock spans all three steps, so concurrent ingests serialize
    /// and searches never observe a vector count inconsistent with the
    /// metadata count. If persistence fails, the in-memory pair rolls back
    /// to its prior length and the error is surfaced as retryable: no
    /// partial batch survives, in memory or on disk.
    #[inline]
    pub fn append_batch(
        &self,
        vectors: &[Vec<f32>],
        records: Vec<ChunkMetadata>,
    ) -> Result<(), StoreError> {
        if vectors.len() != records.len() {
            return Err(StoreError::CountMismatch {
                vectors: vectors.len(),
                records: records.len(),
            });
        }
        if vectors.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let prior_len = inner.index.len();

        inner.index.add(vectors)?;
        inner.metadata.append(records);

        if let Err(e) = self.persist_locked(&inner) {
            warn!("Persist failed, rolling back batch of {}: {}", vectors.len(), e);
            inner.index.truncate(prior_len);
            inner.metadata.truncate(prior_len);
            return Err(e);
        }

        debug!(
            "Committed batch of {} records, store now holds {}",
            vectors.len(),
            inner.index.len()
        );
        Ok(())
    }

    /// Nearest-neighbor probe with metadata resolution, under one read lock.
    ///
    /// Returns up to `min(k, len)` hits in ascending-distance order.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;

        let candidates = inner.index.search(query, k)?;
        let mut hits = Vec::with_capacity(candidates.len());
        for (position, distance) in candidates {
            let metadata = inner.metadata.get(position)?.clone();
            hits.push(SearchHit {
                position,
                distance,
                metadata,
            });
        }

        Ok(hits)
    }

    /// Full-store rewrite: write each artifact to a `.tmp` sibling, then
    /// atomically rename over the live file
    fn persist_locked(&self, inner: &StoreInner) -> Result<(), StoreError> {
        let index_path = self.index_path();
        let index_tmp = index_path.with_extension("bin.tmp");
        let index_file = fs::File::create(&index_tmp)?;
        inner.index.write_to(index_file)?;
        fs::rename(&index_tmp, &index_path)?;

        let metadata_path = self.metadata_path();
        let metadata_tmp = metadata_path.with_extension("json.tmp");
        let metadata_file = fs::File::create(&metadata_tmp)?;
        inner.metadata.write_to(metadata_file)?;
        fs::rename(&metadata_tmp, &metadata_path)?;

        Ok(())
    }
}
