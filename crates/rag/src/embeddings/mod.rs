//! Embedding generation for chunks and queries.
//!
//! Provider-agnostic: the trait hides whether vectors come from a local
//! deterministic embedder or an Ollama model. Embeddings must be
//! deterministic for identical input so re-indexing is stable.

pub mod ollama;
pub mod trigram;

pub use ollama::OllamaEmbedder;
pub use trigram::TrigramEmbedder;

use crate::config::RagConfig;
use grounded_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Index("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from the RAG configuration.
pub fn create_provider(config: &RagConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.embedding_provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramEmbedder::new(config.embedding_dim as usize))),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            config.embedding_endpoint.clone(),
            config.embedding_model.clone(),
            config.embedding_dim as usize,
        ))),
        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            other
        ))),
    }
}
