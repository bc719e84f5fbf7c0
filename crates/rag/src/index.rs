//! Vector index abstraction and its SQLite backend.
//!
//! The index is an opaque nearest-neighbor store from the pipeline's
//! perspective: chunks go in with their embeddings and metadata, ranked hits
//! come out. Indexing is not atomic with respect to concurrent queries; a
//! query racing a rebuild may see a partial index, which is tolerated.

use crate::types::{IndexStats, IndexedChunk};
use grounded_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// A raw search hit from the index, before normalization into a
/// [`crate::types::RetrievedRecord`].
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Chunk text
    pub text: String,

    /// Document identifier
    pub source: String,

    /// Human-readable locator
    pub locator: String,

    /// Cosine similarity to the query
    pub score: f32,
}

/// Trait for vector index backends.
pub trait VectorIndex: Send {
    /// Insert or update chunks with their embeddings.
    fn upsert(&mut self, source: &str, byte_count: u64, chunks: &[IndexedChunk]) -> AppResult<()>;

    /// Search for the top-k most similar chunks to the query embedding.
    ///
    /// Returns hits ordered by descending similarity. An empty index yields
    /// an empty Vec, not an error.
    fn query(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<SearchHit>>;

    /// Get statistics about the index.
    fn stats(&self) -> AppResult<IndexStats>;

    /// Remove all documents and chunks.
    fn drop_all(&mut self) -> AppResult<()>;
}

/// SQLite-backed vector index.
///
/// Embeddings are stored as little-endian f32 BLOBs; similarity is a full
/// scan with cosine scoring, which is adequate for corpus sizes this
/// pipeline targets.
pub struct SqliteIndex {
    conn: Connection,
}

impl SqliteIndex {
    /// Open (or create) an index database at the given path.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Index(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;
        init_schema(&conn)?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Ok(Self { conn })
    }

    /// Open an in-memory index (tests and throwaway runs).
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Index(format!("Failed to open in-memory index: {}", e)))?;
        init_schema(&conn)?;

        Ok(Self { conn })
    }
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            source TEXT PRIMARY KEY,
            indexed_at TEXT NOT NULL DEFAULT (datetime('now')),
            chunk_count INTEGER NOT NULL,
            byte_count INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            chunk_id INTEGER NOT NULL,
            locator TEXT NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source);
        "#,
    )
    .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))
}

impl VectorIndex for SqliteIndex {
    fn upsert(&mut self, source: &str, byte_count: u64, chunks: &[IndexedChunk]) -> AppResult<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Index(format!("Failed to begin transaction: {}", e)))?;

        tx.execute(
            "INSERT OR REPLACE INTO documents (source, chunk_count, byte_count)
             VALUES (?1, ?2, ?3)",
            params![source, chunks.len() as i64, byte_count as i64],
        )
        .map_err(|e| AppError::Index(format!("Failed to insert document: {}", e)))?;

        for chunk in chunks {
            tx.execute(
                "INSERT OR REPLACE INTO chunks (id, source, chunk_id, locator, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    chunk.id,
                    chunk.source,
                    chunk.chunk_id as i64,
                    chunk.locator,
                    chunk.text,
                    embedding_to_bytes(&chunk.embedding),
                ],
            )
            .map_err(|e| AppError::Index(format!("Failed to insert chunk: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| AppError::Index(format!("Failed to commit upsert: {}", e)))?;

        Ok(())
    }

    fn query(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<SearchHit>> {
        let mut stmt = self
            .conn
            .prepare("SELECT text, source, locator, embedding FROM chunks")
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let text: String = row.get(0)?;
                let source: String = row.get(1)?;
                let locator: String = row.get(2)?;
                let embedding_bytes: Vec<u8> = row.get(3)?;
                Ok((text, source, locator, embedding_bytes))
            })
            .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

        let mut results: Vec<SearchHit> = Vec::new();
        for row in rows {
            let (text, source, locator, embedding_bytes) =
                row.map_err(|e| AppError::Index(format!("Failed to read chunk row: {}", e)))?;
            let embedding = bytes_to_embedding(&embedding_bytes)?;
            let score = cosine_similarity(query_embedding, &embedding);
            results.push(SearchHit {
                text,
                source,
                locator,
                score,
            });
        }

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!("Retrieved {} hits (requested top-{})", results.len(), top_k);
        Ok(results)
    }

    fn stats(&self) -> AppResult<IndexStats> {
        let documents_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u32)
            })
            .map_err(|e| AppError::Index(format!("Failed to count documents: {}", e)))?;

        let chunks_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u32)
            })
            .map_err(|e| AppError::Index(format!("Failed to count chunks: {}", e)))?;

        Ok(IndexStats {
            documents_count,
            chunks_count,
        })
    }

    fn drop_all(&mut self) -> AppResult<()> {
        self.conn
            .execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Index(format!("Failed to delete chunks: {}", e)))?;

        self.conn
            .execute("DELETE FROM documents", [])
            .map_err(|e| AppError::Index(format!("Failed to delete documents: {}", e)))?;

        tracing::info!("Dropped all indexed documents");
        Ok(())
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index("Invalid embedding bytes length".to_string()));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_chunk(id: &str, source: &str, chunk_id: u32, text: &str, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            id: id.to_string(),
            source: source.to_string(),
            chunk_id,
            locator: format!("chunk {}", chunk_id),
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_upsert_and_query() {
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let chunks = vec![
            test_chunk("doc.md_0", "doc.md", 0, "rust systems programming", vec![1.0, 0.0, 0.0]),
            test_chunk("doc.md_1", "doc.md", 1, "pasta cooking recipes", vec![0.0, 1.0, 0.0]),
        ];
        index.upsert("doc.md", 100, &chunks).unwrap();

        let hits = index.query(&[1.0, 0.0, 0.0], 5).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "rust systems programming");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_query_empty_index_returns_no_hits() {
        let index = SqliteIndex::open_in_memory().unwrap();
        let hits = index.query(&[1.0, 0.0], 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_query_respects_top_k() {
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let chunks: Vec<IndexedChunk> = (0..8)
            .map(|i| {
                test_chunk(
                    &format!("doc.md_{}", i),
                    "doc.md",
                    i,
                    &format!("chunk number {}", i),
                    vec![1.0, i as f32 / 10.0],
                )
            })
            .collect();
        index.upsert("doc.md", 200, &chunks).unwrap();

        let hits = index.query(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_reindex_replaces_rows() {
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let chunks = vec![test_chunk("doc.md_0", "doc.md", 0, "old text", vec![1.0, 0.0])];
        index.upsert("doc.md", 50, &chunks).unwrap();

        let chunks = vec![test_chunk("doc.md_0", "doc.md", 0, "new text", vec![1.0, 0.0])];
        index.upsert("doc.md", 50, &chunks).unwrap();

        let hits = index.query(&[1.0, 0.0], 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "new text");
    }

    #[test]
    fn test_stats_and_drop() {
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let chunks = vec![
            test_chunk("a.md_0", "a.md", 0, "first", vec![1.0]),
            test_chunk("a.md_1", "a.md", 1, "second", vec![0.5]),
        ];
        index.upsert("a.md", 10, &chunks).unwrap();

        let stats = index.stats().unwrap();
        assert_eq!(stats.documents_count, 1);
        assert_eq!(stats.chunks_count, 2);

        index.drop_all().unwrap();
        let stats = index.stats().unwrap();
        assert_eq!(stats.documents_count, 0);
        assert_eq!(stats.chunks_count, 0);
    }

    #[test]
    fn test_embedding_byte_round_trip() {
        let original = vec![0.25f32, -1.5, 3.75];
        let bytes = embedding_to_bytes(&original);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), original);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!((cosine_similarity(&a, &[0.0, 1.0, 0.0])).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[]), 0.0);
    }
}
