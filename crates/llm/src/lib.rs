//! LLM integration crate for the Grounded workspace.
//!
//! This crate provides a provider-agnostic abstraction for interacting with
//! Large Language Models (LLMs). It supports multiple providers through a
//! unified trait-based interface, and classifies failures into a typed
//! [`LlmError`] so consumers can apply differentiated fallback policies
//! (degrade on unavailable, advise on transient, discard on malformed).
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **OpenAI**: Any OpenAI-compatible chat completions endpoint
//!
//! # Example
//! ```no_run
//! use grounded_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use error::{LlmError, LlmResult};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
