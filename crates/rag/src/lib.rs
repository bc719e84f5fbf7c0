//! Grounded retrieval pipeline.
//!
//! Documents are parsed, chunked with section-aware overlap, embedded, and
//! indexed. Questions are answered by retrieving the closest chunks,
//! rendering them into a citation-bearing context block, and calling the
//! configured LLM; every failure mode of the external capabilities degrades
//! to a defined fallback rather than an error.

pub mod answer;
pub mod chunker;
pub mod citations;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod parser;
pub mod retriever;
pub mod types;

// Re-export commonly used items
pub use answer::{answer, NO_RESULTS_ANSWER};
pub use config::RagConfig;
pub use retriever::retrieve;
pub use types::{
    Citation, GroundedAnswer, IndexStats, IngestOptions, IngestStats, RetrievedRecord,
};

use crate::embeddings::EmbeddingProvider;
use crate::index::{SqliteIndex, VectorIndex};
use crate::parser::DocumentType;
use crate::types::IndexedChunk;
use grounded_core::AppResult;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

/// Ingest documents into the vector index.
///
/// A document that fails to parse aborts only its own ingestion; the batch
/// continues. Directory walks only consider supported file types.
pub async fn ingest(workspace: &Path, options: &IngestOptions) -> AppResult<IngestStats> {
    let start = Instant::now();

    let config = config::load_config(workspace)?;
    let embedder = embeddings::create_provider(&config)?;

    let mut index = SqliteIndex::open(&config::get_index_path(workspace))?;

    if options.reset {
        tracing::info!("Resetting index before ingestion");
        index.drop_all()?;
    }

    let mut documents_count = 0u32;
    let mut chunks_count = 0u32;
    let mut failed_count = 0u32;
    let mut bytes_processed = 0u64;

    for path in &options.paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if !entry_path.is_file() || !DocumentType::from_path(entry_path).is_supported() {
                    continue;
                }
                match ingest_file(&mut index, embedder.as_ref(), &config, entry_path).await {
                    Ok((chunks, bytes)) => {
                        documents_count += 1;
                        chunks_count += chunks;
                        bytes_processed += bytes;
                    }
                    Err(e) => {
                        tracing::warn!("Skipping {:?}: {}", entry_path, e);
                        failed_count += 1;
                    }
                }
            }
        } else {
            match ingest_file(&mut index, embedder.as_ref(), &config, path).await {
                Ok((chunks, bytes)) => {
                    documents_count += 1;
                    chunks_count += chunks;
                    bytes_processed += bytes;
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    failed_count += 1;
                }
            }
        }
    }

    // Persist the effective config so later queries embed the same way
    config::save_config(workspace, &config)?;

    let duration = start.elapsed();

    tracing::info!(
        "Ingestion completed: {} documents, {} chunks, {} bytes in {:.2}s ({} failed)",
        documents_count,
        chunks_count,
        bytes_processed,
        duration.as_secs_f64(),
        failed_count
    );

    Ok(IngestStats {
        documents_count,
        chunks_count,
        failed_count,
        bytes_processed,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Parse, chunk, embed, and index a single document.
async fn ingest_file(
    index: &mut SqliteIndex,
    embedder: &dyn EmbeddingProvider,
    config: &RagConfig,
    path: &Path,
) -> AppResult<(u32, u64)> {
    tracing::debug!("Ingesting {:?}", path);

    let text = parser::parse_file(path)?;
    let byte_count = text.len() as u64;

    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let candidates = chunker::chunk_text(
        &text,
        config.chunk_size as usize,
        config.chunk_overlap as usize,
    );

    if candidates.is_empty() {
        tracing::debug!("{:?} produced no chunks", path);
        return Ok((0, byte_count));
    }

    let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;

    let chunks: Vec<IndexedChunk> = candidates
        .iter()
        .zip(embeddings)
        .map(|(candidate, embedding)| IndexedChunk {
            id: format!("{}_{}", source, candidate.index),
            source: source.clone(),
            chunk_id: candidate.index,
            locator: candidate.locator(),
            text: candidate.text.clone(),
            embedding,
        })
        .collect();

    index.upsert(&source, byte_count, &chunks)?;

    tracing::debug!("Indexed {:?}: {} chunks, {} bytes", path, chunks.len(), byte_count);
    Ok((chunks.len() as u32, byte_count))
}

/// Drop everything from the index.
pub fn reset(workspace: &Path) -> AppResult<()> {
    let index_path = config::get_index_path(workspace);
    if !index_path.exists() {
        tracing::info!("No index to reset");
        return Ok(());
    }

    let mut index = SqliteIndex::open(&index_path)?;
    index.drop_all()
}

/// Get statistics for the index.
pub fn stats(workspace: &Path) -> AppResult<IndexStats> {
    let index_path = config::get_index_path(workspace);
    if !index_path.exists() {
        return Ok(IndexStats {
            documents_count: 0,
            chunks_count: 0,
        });
    }

    let index = SqliteIndex::open(&index_path)?;
    index.stats()
}
