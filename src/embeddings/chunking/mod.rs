#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Sentence boundaries: terminal punctuation followed by whitespace, or a
/// newline run. Heuristic only; abbreviations like "Dr." may mis-split.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?<=[.!?])\s+|\n+").expect("valid regex"));

/// Configuration for sentence-aware chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Soft cap on chunk size in characters. A chunk may exceed this when a
    /// single sentence is longer than the cap, or by the spaces joining its
    /// sentences.
    pub max_chars: usize,
    /// Number of trailing sentences carried into the next chunk. Zero
    /// disables overlap.
    pub overlap_sentences: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_chars: 500,
            overlap_sentences: 1,
        }
    }
}

/// Split text into trimmed, non-empty sentences
#[inline]
pub fn split_sentences(text: &str) -> Result<Vec<String>> {
    let mut sentences = Vec::new();

    for segment in SENTENCE_BOUNDARY.split(text) {
        let segment = segment.context("Failed to match sentence boundary")?;
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }
    }

    Ok(sentences)
}

/// Chunk text into bounded, sentence-respecting segments.
///
/// Sentences accumulate into a buffer. Before a sentence is appended, if the
/// buffer is non-empty and adding the sentence would exceed `max_chars`, the
/// buffer is flushed as one chunk (sentences joined with single spaces) and
/// reset to its last `overlap_sentences` sentences. The non-empty remainder
/// flushes at the end.
///
/// Sentences are never split: a single sentence longer than `max_chars` is
/// emitted as its own oversized chunk. Lengths are counted in characters,
/// excluding the joining spaces. Empty input yields no chunks, and no chunk
/// is ever empty.
///
/// Pure function of its inputs; identical input yields identical output.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>> {
    let sentences = split_sentences(text)?;

    let mut chunks = Vec::new();
    let mut buffer: Vec<String> = Vec::new();
    let mut buffer_chars = 0usize;

    for sentence in sentences {
        let sentence_chars = sentence.chars().count();

        if !buffer.is_empty() && buffer_chars + sentence_chars > config.max_chars {
            chunks.push(buffer.join(" "));

            // Keep the last `overlap_sentences` sentences and their length
            let tail_start = buffer.len() - config.overlap_sentences.min(buffer.len());
            buffer.drain(..tail_start);
            buffer_chars = buffer.iter().map(|s| s.chars().count()).sum();
        }

        buffer.push(sentence);
        buffer_chars += sentence_chars;
    }

    if !buffer.is_empty() {
        chunks.push(buffer.join(" "));
    }

    debug!(
        "Chunked {} characters into {} chunks",
        text.chars().count(),
        chunks.len()
    );

    Ok(chunks)
}
