#[cfg(test)]
mod tests;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use super::StoreError;

/// Metadata for one indexed chunk, stored at the same ordinal position as
/// its vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_id: String,
    pub text: String,
}

/// Position-ordered record list, one entry per indexed vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStore {
    records: Vec<ChunkMetadata>,
}

impl MetadataStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append records in the same count and order as the vectors they
    /// describe
    #[inline]
    pub fn append(&mut self, records: Vec<ChunkMetadata>) {
        debug!("Appending {} metadata records", records.len());
        self.records.extend(records);
    }

    /// Fetch the record at an index position
    #[inline]
    pub fn get(&self, position: usize) -> Result<&ChunkMetadata, StoreError> {
        self.records
            .get(position)
            .ok_or_else(|| StoreError::OutOfRange {
                position,
                len: self.records.len(),
            })
    }

    /// Remove the records appended after `len`, restoring a prior state
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Chunk counts per document id, sorted by document id
    #[inline]
    pub fn document_counts(&self) -> Vec<(String, usize)> {
        self.records
            .iter()
            .counts_by(|record| record.document_id.clone())
            .into_iter()
            .sorted()
            .collect()
    }

    /// Serialize the ordered record list as a JSON array
    #[inline]
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        serde_json::to_writer(writer, &self.records)?;
        Ok(())
    }

    /// Deserialize a metadata artifact
    #[inline]
    pub fn read_from<R: Read>(reader: R) -> Result<Self, StoreError> {
        let records: Vec<ChunkMetadata> = serde_json::from_reader(reader).map_err(|e| {
            StoreError::Corrupted(format!("metadata artifact is not a valid record list: {e}"))
        })?;
        debug!("Loaded {} metadata records", records.len());
        Ok(Self { records })
    }

    /// Load a metadata artifact from disk
    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = std::fs::File::open(path)?;
        Self::read_from(file)
    }
}
