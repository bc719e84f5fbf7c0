//! RAG pipeline type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A chunk emitted by the chunker, before embedding.
///
/// `index` values for a single source are dense and strictly increasing from
/// zero; `section` carries the most recent heading seen before the chunk was
/// emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkCandidate {
    /// Chunk text, word order preserved exactly as encountered
    pub text: String,

    /// Emission-order index, starting at 0
    pub index: u32,

    /// Heading label in effect when the chunk was emitted
    pub section: Option<String>,
}

impl ChunkCandidate {
    /// Human-readable pointer to where this chunk came from within its source.
    pub fn locator(&self) -> String {
        match self.section {
            Some(ref section) => format!("{} (chunk {})", section, self.index),
            None => format!("chunk {}", self.index),
        }
    }
}

/// A chunk with its embedding, ready for the vector index.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    /// Index row id, unique per (source, chunk index)
    pub id: String,

    /// Document identifier (file name)
    pub source: String,

    /// Chunk emission index within the source
    pub chunk_id: u32,

    /// Human-readable locator (section + chunk index)
    pub locator: String,

    /// Chunk text
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// A ranked search hit, normalized for answer assembly.
///
/// Derived per retrieval call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedRecord {
    /// Full chunk text
    pub text: String,

    /// Document identifier
    pub source: String,

    /// Human-readable locator within the source
    pub locator: String,

    /// Bounded prefix of `text`, truncation-marked
    pub snippet: String,
}

/// A deduplicated source reference surfaced alongside an answer.
///
/// At most one citation exists per distinct `(source, locator)` pair within a
/// single answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// Document identifier
    pub source: String,

    /// Human-readable locator within the source
    pub locator: String,

    /// Snippet of the first record seen for this key
    pub snippet: String,
}

/// A generated answer with its grounding citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedAnswer {
    /// Answer text (generated, or a deterministic fallback)
    pub answer: String,

    /// Deduplicated citations in first-seen order
    pub citations: Vec<Citation>,
}

/// Options for the index (ingestion) operation.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Files or directories to ingest
    pub paths: Vec<PathBuf>,

    /// Drop the existing index first
    pub reset: bool,
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of documents indexed
    pub documents_count: u32,

    /// Number of chunks indexed
    pub chunks_count: u32,

    /// Number of documents that failed to parse
    pub failed_count: u32,

    /// Total bytes of extracted text processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of indexed documents
    pub documents_count: u32,

    /// Number of indexed chunks
    pub chunks_count: u32,
}
