#[cfg(test)]
mod tests;

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

use super::StoreError;

/// Artifact header: magic, format version, dimension, vector count
const INDEX_MAGIC: [u8; 4] = *b"DQVI";
const INDEX_FORMAT_VERSION: u32 = 1;

/// Flat exact nearest-neighbor index over fixed-dimension `f32` vectors.
///
/// Vectors are addressed by insertion-order position. Distances are squared
/// Euclidean with no normalization, so embeddings must already be on a
/// comparable scale across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    /// Row-major storage, `dimension` floats per vector
    values: Vec<f32>,
}

impl VectorIndex {
    /// Create an empty index for vectors of the given dimension
    #[inline]
    pub fn new(dimension: usize) -> Result<Self, StoreError> {
        if dimension == 0 {
            return Err(StoreError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            values: Vec::new(),
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed vectors
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append vectors in order.
    ///
    /// Every vector is validated against the configured dimension before any
    /// is appended; a mismatch rejects the whole batch.
    #[inline]
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), StoreError> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        self.values.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.values.extend_from_slice(vector);
        }

        debug!("Added {} vectors, index now holds {}", vectors.len(), self.len());
        Ok(())
    }

    /// Remove the vectors appended after `len`, restoring a prior state
    pub(crate) fn truncate(&mut self, len: usize) {
        self.values.truncate(len * self.dimension);
    }

    /// Return up to `min(k, len)` positions ordered by ascending squared
    /// Euclidean distance to `query`, ties broken by insertion order.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, StoreError> {
        if query.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .values
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| (position, squared_distance(query, vector)))
            .collect();

        scored.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored)
    }

    /// Serialize the index: header followed by little-endian `f32` values
    #[inline]
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        let mut writer = BufWriter::new(writer);

        writer.write_all(&INDEX_MAGIC)?;
        writer.write_all(&INDEX_FORMAT_VERSION.to_le_bytes())?;
        writer.write_all(&(self.dimension as u64).to_le_bytes())?;
        writer.write_all(&(self.len() as u64).to_le_bytes())?;
        for value in &self.values {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Deserialize an index artifact, validating header and payload length
    #[inline]
    pub fn read_from<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut reader = BufReader::new(reader);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(|_| {
            StoreError::Corrupted("index artifact too short for header".to_string())
        })?;
        if magic != INDEX_MAGIC {
            return Err(StoreError::Corrupted(
                "index artifact has unrecognized magic bytes".to_string(),
            ));
        }

        let version = read_u32(&mut reader)?;
        if version != INDEX_FORMAT_VERSION {
            return Err(StoreError::Corrupted(format!(
                "unsupported index format version: {version}"
            )));
        }

        let dimension = usize::try_from(read_u64(&mut reader)?)
            .map_err(|_| StoreError::Corrupted("index dimension overflows usize".to_string()))?;
        if dimension == 0 {
            return Err(StoreError::Corrupted(
                "index artifact declares zero dimension".to_string(),
            ));
        }

        let count = usize::try_from(read_u64(&mut reader)?)
            .map_err(|_| StoreError::Corrupted("index count overflows usize".to_string()))?;

        let total = count.checked_mul(dimension).ok_or_else(|| {
            StoreError::Corrupted("index payload length overflows usize".to_string())
        })?;

        let mut values = Vec::with_capacity(total);
        let mut buf = [0u8; 4];
        for _ in 0..total {
            reader.read_exact(&mut buf).map_err(|_| {
                StoreError::Corrupted("index artifact truncated mid-payload".to_string())
            })?;
            values.push(f32::from_le_bytes(buf));
        }

        if reader.read(&mut buf)? != 0 {
            return Err(StoreError::Corrupted(
                "index artifact has trailing bytes past declared payload".to_string(),
            ));
        }

        debug!("Loaded index with {} vectors of dimension {}", count, dimension);
        Ok(Self { dimension, values })
    }

    /// Load an index artifact from disk
    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = std::fs::File::open(path)?;
        Self::read_from(file)
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, StoreError> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|_| StoreError::Corrupted("index artifact too short for header".to_string()))?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, StoreError> {
    let mut buf = [0u8; 8];
    reader
        .read_exact(&mut buf)
        .map_err(|_| StoreError::Corrupted("index artifact too short for header".to_string()))?;
    Ok(u64::from_le_bytes(buf))
}
