//! Answer assembly: retrieval, generation, and the fallback ladder.
//!
//! Generation failure never discards retrieval grounding. Once records are
//! retrieved, the citation list is computed up front and returned with
//! whatever answer text the ladder produces: a generated answer, a
//! deterministic snippet answer when no provider is configured, or an
//! advisory when the provider fails transiently.

use crate::citations;
use crate::retriever;
use crate::types::{GroundedAnswer, RetrievedRecord};
use grounded_core::{config::AppConfig, AppResult};
use grounded_llm::{create_client, LlmError, LlmRequest};
use std::time::Duration;

/// Fixed response when retrieval finds nothing; the LLM is never invoked.
pub const NO_RESULTS_ANSWER: &str = "I couldn't find relevant information in the indexed \
     documents. Index documents first or try a different question.";

/// Bound on the completion call; expiry is treated as a transient failure.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Answer a question grounded in the indexed corpus.
pub async fn answer(config: &AppConfig, question: &str, top_k: usize) -> AppResult<GroundedAnswer> {
    let records = retriever::retrieve(&config.workspace, question, top_k).await?;

    if records.is_empty() {
        return Ok(GroundedAnswer {
            answer: NO_RESULTS_ANSWER.to_string(),
            citations: Vec::new(),
        });
    }

    // Citations are computed before generation so every branch below can
    // return them.
    let citation_list = citations::collect_citations(&records);
    let context = citations::format_context(&records);

    let endpoint = config.resolve_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);

    let client = match create_client(&config.provider, endpoint.as_deref(), api_key.as_deref()) {
        Ok(client) => client,
        Err(LlmError::Unavailable) => {
            tracing::info!("No LLM configured; answering with top snippet");
            return Ok(GroundedAnswer {
                answer: unavailable_fallback(&records),
                citations: citation_list,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let prompt = citations::build_citation_prompt(&context, question);
    let request = LlmRequest::new(prompt, &config.model).with_temperature(0.0);

    let answer = match tokio::time::timeout(COMPLETION_TIMEOUT, client.complete(&request)).await {
        Ok(Ok(response)) => response.content.trim().to_string(),
        Ok(Err(LlmError::Unavailable)) => unavailable_fallback(&records),
        Ok(Err(e)) if e.is_transient() => {
            tracing::warn!("Transient LLM failure, falling back: {}", e);
            transient_fallback(&records)
        }
        Ok(Err(e)) => {
            // Non-transient provider errors surface as the answer body; the
            // grounding already computed still reaches the caller.
            tracing::error!("LLM call failed: {}", e);
            format!("LLM error: {}", e)
        }
        Err(_) => {
            tracing::warn!("LLM call timed out after {:?}", COMPLETION_TIMEOUT);
            transient_fallback(&records)
        }
    };

    Ok(GroundedAnswer {
        answer,
        citations: citation_list,
    })
}

/// Deterministic answer when no provider is configured.
fn unavailable_fallback(records: &[RetrievedRecord]) -> String {
    format!(
        "No LLM configured. Use the 'ollama' provider for a local model, or configure an \
         OpenAI API key. Top result: {}...",
        prefix_chars(&records[0].snippet, 100)
    )
}

/// Advisory answer when the provider failed transiently.
fn transient_fallback(records: &[RetrievedRecord]) -> String {
    format!(
        "Relevant passages were retrieved, but the LLM is temporarily unavailable \
         (rate limit or quota exceeded). Top result: {}...",
        prefix_chars(&records[0].snippet, 150)
    )
}

fn prefix_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RetrievedRecord;

    fn record(snippet: &str) -> RetrievedRecord {
        RetrievedRecord {
            text: snippet.to_string(),
            source: "doc.md".to_string(),
            locator: "chunk 0".to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_index_short_circuits_to_advisory() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            workspace: dir.path().to_path_buf(),
            ..Default::default()
        };

        let result = answer(&config, "what is the leave policy?", 5).await.unwrap();
        assert_eq!(result.answer, NO_RESULTS_ANSWER);
        assert!(result.citations.is_empty());
    }

    #[test]
    fn test_unavailable_fallback_carries_top_snippet() {
        let records = vec![record("the leave policy grants 25 days"), record("other")];
        let fallback = unavailable_fallback(&records);

        assert!(fallback.contains("No LLM configured"));
        assert!(fallback.contains("the leave policy grants 25 days"));
    }

    #[test]
    fn test_transient_fallback_carries_top_snippet() {
        let records = vec![record("quarterly report numbers")];
        let fallback = transient_fallback(&records);

        assert!(fallback.contains("temporarily unavailable"));
        assert!(fallback.contains("quarterly report numbers"));
    }

    #[test]
    fn test_prefix_chars_respects_char_boundaries() {
        assert_eq!(prefix_chars("héllo wörld", 5), "héllo");
        assert_eq!(prefix_chars("ab", 10), "ab");
    }
}
