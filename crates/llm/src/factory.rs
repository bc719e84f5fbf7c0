//! LLM provider factory.
//!
//! This module provides a factory for creating LLM clients based on
//! application configuration. It handles provider resolution and credential
//! checks; a provider with no credentials resolves to
//! [`LlmError::Unavailable`] so consumers can degrade instead of failing.

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::providers::{OllamaClient, OpenAiClient};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Errors
/// Returns [`LlmError::Unavailable`] when the provider requires credentials
/// that are not present, and [`LlmError::Other`] for unknown providers.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> LlmResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url);
            Ok(Arc::new(client))
        }
        "openai" => match api_key {
            Some(key) if !key.is_empty() => {
                let client = match endpoint {
                    Some(url) => OpenAiClient::with_base_url(url, key),
                    None => OpenAiClient::new(key),
                };
                Ok(Arc::new(client))
            }
            _ => {
                tracing::debug!("OpenAI provider requested without an API key");
                Err(LlmError::Unavailable)
            }
        },
        _ => Err(LlmError::Other(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_openai_without_key_is_unavailable() {
        match create_client("openai", None, None) {
            Err(LlmError::Unavailable) => {}
            other => panic!("Expected Unavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_openai_with_key() {
        let client = create_client("openai", None, Some("sk-test"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(LlmError::Other(msg)) => assert!(msg.contains("Unknown provider")),
            other => panic!("Expected error for unknown provider, got {:?}", other.map(|_| ())),
        }
    }
}
