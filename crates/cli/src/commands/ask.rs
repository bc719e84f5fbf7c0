//! Ask command handler.
//!
//! Answers a question from the indexed corpus with inline citations, then
//! runs the memory pipeline over the turn.

use clap::Args;
use grounded_core::{config::AppConfig, AppResult};
use grounded_llm::{create_client, LlmError};
use grounded_memory::{MemoryStore, MemoryStoreConfig};

/// Ask a question grounded in the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of passages to retrieve
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Skip the memory pipeline for this turn
    #[arg(long)]
    pub no_memory: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let result = grounded_rag::answer(config, &self.question, self.top_k).await?;

        if self.json {
            let output = serde_json::json!({
                "question": self.question,
                "answer": result.answer,
                "citations": result.citations,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", result.answer);

            if !result.citations.is_empty() {
                println!("\nSources:");
                for citation in &result.citations {
                    println!("- {} ({})", citation.source, citation.locator);
                }
            }
        }

        if !self.no_memory {
            let written = self.process_memory(config, &result.answer).await?;
            if written > 0 && !self.json {
                println!("\nRemembered: {} fact(s)", written);
            }
        }

        Ok(())
    }

    /// Run the memory pipeline over this turn. A missing LLM capability
    /// yields zero facts, not an error.
    async fn process_memory(&self, config: &AppConfig, answer: &str) -> AppResult<usize> {
        let store = MemoryStore::new(MemoryStoreConfig::in_dir(&config.workspace));

        let endpoint = config.resolve_endpoint(&config.provider);
        let api_key = config.resolve_api_key(&config.provider);
        let client = match create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
        {
            Ok(client) => Some(client),
            Err(LlmError::Unavailable) => None,
            Err(e) => return Err(e.into()),
        };

        let written = store
            .process_turn(
                client.as_deref(),
                &config.model,
                &self.question,
                answer,
            )
            .await?;

        for fact in &written {
            tracing::debug!("Stored {} fact: {}", fact.target.as_str(), fact.summary);
        }

        Ok(written.len())
    }
}
