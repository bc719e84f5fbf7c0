//! Memory command handler.
//!
//! Inspects the durable memory stores and runs the extraction pipeline over
//! a conversation turn supplied on the command line.

use clap::{Args, Subcommand};
use grounded_core::{config::AppConfig, AppResult};
use grounded_llm::{create_client, LlmError};
use grounded_memory::{MemoryStore, MemoryStoreConfig, MemoryTarget};

/// Inspect or update the durable memory stores
#[derive(Args, Debug)]
pub struct MemoryCommand {
    #[command(subcommand)]
    pub action: MemoryAction,
}

#[derive(Subcommand, Debug)]
pub enum MemoryAction {
    /// Extract and persist facts from one conversation turn
    Note(MemoryNoteCommand),
    /// Print a memory store
    Show(MemoryShowCommand),
}

impl MemoryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            MemoryAction::Note(cmd) => cmd.execute(config).await,
            MemoryAction::Show(cmd) => cmd.execute(config).await,
        }
    }
}

/// Extract and persist facts from one conversation turn
#[derive(Args, Debug)]
pub struct MemoryNoteCommand {
    /// The user message of the turn
    pub user_message: String,

    /// The assistant message of the turn
    pub assistant_message: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl MemoryNoteCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing memory note command");

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
                &self.user_message,
                &self.assistant_message,
            )
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&written)?);
        } else if written.is_empty() {
            println!("Nothing worth remembering in this turn.");
        } else {
            for fact in &written {
                println!("[{}] {}", fact.target.as_str(), fact.summary);
            }
        }

        Ok(())
    }
}

/// Print a memory store
#[derive(Args, Debug)]
pub struct MemoryShowCommand {
    /// Which store to print (user, company)
    pub target: String,
}

impl MemoryShowCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let Some(target) = MemoryTarget::parse(&self.target) else {
            return Err(grounded_core::AppError::Config(format!(
                "Unknown memory target: {}. Expected 'user' or 'company'",
                self.target
            )));
        };

        let store = MemoryStore::new(MemoryStoreConfig::in_dir(&config.workspace));
        let content = store.load_for_context(target)?;

        if content.is_empty() {
            println!("({} memory is empty)", target.as_str());
        } else {
            println!("{}", content);
        }

        Ok(())
    }
}
