//! RAG pipeline configuration management.

use grounded_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the chunking, embedding, and retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunk size as an accumulated character budget
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Overlap between consecutive chunks, in words
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,

    /// Embedding provider ("trigram" or "ollama")
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: String,

    /// Embedding model (only meaningful for remote providers)
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding endpoint (only meaningful for remote providers)
    #[serde(default = "default_embedding_endpoint")]
    pub embedding_endpoint: String,

    /// Embedding vector dimension
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: u32,

    /// Upper bound on retrieval depth, applied regardless of caller request
    /// to keep the prompt bounded
    #[serde(default = "default_max_top_k")]
    pub max_top_k: u32,
}

fn default_chunk_size() -> u32 {
    500
}

fn default_chunk_overlap() -> u32 {
    50
}

fn default_embedding_provider() -> String {
    "trigram".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_dim() -> u32 {
    384
}

fn default_max_top_k() -> u32 {
    10
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embedding_provider: default_embedding_provider(),
            embedding_model: default_embedding_model(),
            embedding_endpoint: default_embedding_endpoint(),
            embedding_dim: default_embedding_dim(),
            max_top_k: default_max_top_k(),
        }
    }
}

/// Load the RAG configuration.
///
/// Loads from `.grounded/rag.yaml` if it exists, otherwise returns defaults.
pub fn load_config(workspace: &Path) -> AppResult<RagConfig> {
    let config_path = get_config_path(workspace);

    if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: RagConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Loaded RAG config from {:?}", config_path);
        Ok(config)
    } else {
        tracing::debug!("Using default RAG config (no config file found)");
        Ok(RagConfig::default())
    }
}

/// Save the RAG configuration.
pub fn save_config(workspace: &Path, config: &RagConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    let yaml = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    Ok(())
}

/// Get the path to the RAG config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".grounded").join("rag.yaml")
}

/// Get the path to the vector index database.
pub fn get_index_path(workspace: &Path) -> PathBuf {
    workspace.join(".grounded").join("index.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.embedding_provider, "trigram");
        assert_eq!(config.max_top_k, 10);
    }

    #[test]
    fn test_load_missing_config_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.chunk_size, 500);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = RagConfig {
            chunk_size: 250,
            max_top_k: 4,
            ..Default::default()
        };
        save_config(dir.path(), &config).unwrap();

        let reloaded = load_config(dir.path()).unwrap();
        assert_eq!(reloaded.chunk_size, 250);
        assert_eq!(reloaded.max_top_k, 4);
    }
}
