//! Citation-preserving retrieval.
//!
//! Delegates embedding and nearest-neighbor search to the index, then
//! normalizes hits into [`RetrievedRecord`]s carrying everything answer
//! assembly needs: full text for the prompt, source and locator for
//! citations, and a bounded snippet for display.

use crate::config;
use crate::embeddings::{self, EmbeddingProvider};
use crate::index::{SearchHit, SqliteIndex, VectorIndex};
use crate::types::RetrievedRecord;
use grounded_core::AppResult;
use std::path::Path;

/// Snippet length in characters.
const SNIPPET_LEN: usize = 200;

/// Retrieve the most relevant records for a query, best match first.
///
/// `top_k` is capped at the configured `max_top_k` to bound prompt size
/// regardless of caller request. A missing index or zero hits yields an
/// empty Vec; downstream treats that as "no grounding available", not an
/// error.
pub async fn retrieve(workspace: &Path, query: &str, top_k: usize) -> AppResult<Vec<RetrievedRecord>> {
    let config = config::load_config(workspace)?;

    let index_path = config::get_index_path(workspace);
    if !index_path.exists() {
        tracing::info!("No index exists yet; returning no records");
        return Ok(Vec::new());
    }

    let index = SqliteIndex::open(&index_path)?;
    let embedder = embeddings::create_provider(&config)?;

    let query_embedding = embedder.embed(query).await?;
    let k = top_k.min(config.max_top_k as usize);

    let hits = index.query(&query_embedding, k)?;

    tracing::info!(
        "Retrieved {} records for query (requested top-{}, capped at {})",
        hits.len(),
        top_k,
        k
    );

    Ok(hits.into_iter().map(to_record).collect())
}

/// Normalize a raw hit into a retrieval record.
fn to_record(hit: SearchHit) -> RetrievedRecord {
    let snippet = snippet_of(&hit.text);
    RetrievedRecord {
        text: hit.text,
        source: hit.source,
        locator: hit.locator,
        snippet,
    }
}

/// First `SNIPPET_LEN` characters of `text`, with a truncation marker
/// appended only when truncation occurred.
pub(crate) fn snippet_of(text: &str) -> String {
    if text.chars().count() > SNIPPET_LEN {
        let prefix: String = text.chars().take(SNIPPET_LEN).collect();
        format!("{}...", prefix)
    } else {
        text.to_string()
    }
}
