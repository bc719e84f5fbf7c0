//! Stats command handler.
//!
//! Displays vector index statistics.

use clap::Args;
use grounded_core::{config::AppConfig, AppResult};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let stats = grounded_rag::stats(&config.workspace)?;

        if self.json {
            let output = serde_json::json!({
                "documentsCount": stats.documents_count,
                "chunksCount": stats.chunks_count,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Documents: {}", stats.documents_count);
            println!("Chunks:    {}", stats.chunks_count);
        }

        Ok(())
    }
}
