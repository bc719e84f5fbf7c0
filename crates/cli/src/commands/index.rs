//! Index command handler.
//!
//! Ingests documents into the retrieval corpus: parse, chunk, embed, upsert.

use clap::Args;
use grounded_core::{config::AppConfig, AppResult};
use grounded_rag::IngestOptions;
use std::path::PathBuf;

/// Index documents into the retrieval corpus
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Files or directories to index
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Drop the existing index before indexing
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command for {} path(s)", self.paths.len());

        let options = IngestOptions {
            paths: self.paths.clone(),
            reset: self.reset,
        };

        let stats = grounded_rag::ingest(&config.workspace, &options).await?;

        if self.json {
            let output = serde_json::json!({
                "documentsCount": stats.documents_count,
                "chunksCount": stats.chunks_count,
                "failedCount": stats.failed_count,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Indexed {} documents ({} chunks, {} bytes) in {:.2}s",
                stats.documents_count,
                stats.chunks_count,
                stats.bytes_processed,
                stats.duration_secs
            );
            if stats.failed_count > 0 {
                println!("Skipped {} document(s) that failed to parse", stats.failed_count);
            }
        }

        Ok(())
    }
}
