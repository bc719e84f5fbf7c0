//! LLM-driven fact extraction from a conversation turn.
//!
//! The model is asked for at most two high-confidence candidates as a JSON
//! array. Extraction is strictly best-effort: a missing capability, a
//! transient failure, a timeout, or an unparseable response all yield zero
//! candidates rather than an error.

use crate::types::FactCandidate;
use grounded_llm::{LlmClient, LlmRequest};
use std::time::Duration;

/// Candidates below this confidence are discarded. Boundary inclusive.
pub const MIN_CONFIDENCE: f64 = 0.8;

/// Bound on the extraction call; expiry yields zero candidates.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the extraction prompt for a single conversation turn.
fn build_extraction_prompt(user_message: &str, assistant_message: &str) -> String {
    format!(
        "Analyze this conversation turn. Extract ONLY high-signal, reusable facts worth remembering.\n\
         Rules:\n\
         - USER facts: personal preferences, role, workflow preferences (e.g., \"User prefers weekly summaries on Mondays\", \"User is a Project Finance Analyst\")\n\
         - COMPANY facts: org-wide learnings, workflows, bottlenecks (e.g., \"Asset Management interfaces with Project Finance\", \"Recurring bottleneck is X\")\n\
         - Do NOT store: raw transcript, secrets, PII, low-value chitchat\n\
         - Be selective: only 0-2 facts per turn, high confidence only\n\
         \n\
         Conversation turn:\n\
         User: {user_message}\n\
         Assistant: {assistant_message}\n\
         \n\
         Respond with a JSON array of objects. Each object: {{\"target\": \"USER\" or \"COMPANY\", \"summary\": \"brief fact\", \"confidence\": 0.0-1.0}}\n\
         If nothing worth storing, return: []\n\
         Example: [{{\"target\": \"USER\", \"summary\": \"User prefers weekly summaries on Mondays.\", \"confidence\": 0.9}}]"
    )
}

/// Extract fact candidates from a single turn, keeping only those at or
/// above [`MIN_CONFIDENCE`].
pub async fn extract_candidates(
    client: &dyn LlmClient,
    model: &str,
    user_message: &str,
    assistant_message: &str,
) -> Vec<FactCandidate> {
    let prompt = build_extraction_prompt(user_message, assistant_message);
    let request = LlmRequest::new(prompt, model).with_temperature(0.0);

    let content = match tokio::time::timeout(EXTRACTION_TIMEOUT, client.complete(&request)).await {
        Ok(Ok(response)) => response.content,
        Ok(Err(e)) => {
            tracing::debug!("Memory extraction skipped, LLM failed: {}", e);
            return Vec::new();
        }
        Err(_) => {
            tracing::debug!("Memory extraction skipped, LLM call timed out");
            return Vec::new();
        }
    };

    parse_candidates(&content)
}

/// Parse the model's response into confidence-filtered candidates.
///
/// Non-JSON or unexpectedly shaped responses yield zero candidates.
pub fn parse_candidates(content: &str) -> Vec<FactCandidate> {
    let body = strip_code_fence(content);

    let candidates: Vec<FactCandidate> = match serde_json::from_str(&body) {
        Ok(items) => items,
        Err(e) => {
            tracing::debug!("Discarding malformed extraction response: {}", e);
            return Vec::new();
        }
    };

    candidates
        .into_iter()
        .filter(|c| c.confidence >= MIN_CONFIDENCE)
        .collect()
}

/// Models wrap JSON in markdown code blocks often enough that the fence has
/// to be stripped before parsing.
fn strip_code_fence(content: &str) -> String {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() > 2 {
        lines[1..lines.len() - 1].join("\n")
    } else {
        "[]".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json_array() {
        let content = r#"[{"target": "USER", "summary": "Prefers Mondays", "confidence": 0.9}]"#;
        let candidates = parse_candidates(content);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].summary, "Prefers Mondays");
    }

    #[test]
    fn test_parse_fenced_json_array() {
        let content = "```json\n[{\"target\": \"COMPANY\", \"summary\": \"Team X owns Y\", \"confidence\": 0.95}]\n```";
        let candidates = parse_candidates(content);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target, "COMPANY");
    }

    #[test]
    fn test_confidence_filter_boundary_inclusive() {
        let content = r#"[
            {"target": "USER", "summary": "kept", "confidence": 0.8},
            {"target": "USER", "summary": "dropped", "confidence": 0.79}
        ]"#;
        let candidates = parse_candidates(content);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].summary, "kept");
    }

    #[test]
    fn test_malformed_response_yields_zero_candidates() {
        assert!(parse_candidates("I remembered nothing today.").is_empty());
        assert!(parse_candidates("{\"not\": \"an array\"}").is_empty());
        assert!(parse_candidates("").is_empty());
    }

    #[test]
    fn test_empty_array_response() {
        assert!(parse_candidates("[]").is_empty());
        assert!(parse_candidates("```\n[]\n```").is_empty());
    }

    #[test]
    fn test_degenerate_fence_yields_zero_candidates() {
        assert!(parse_candidates("```").is_empty());
        assert!(parse_candidates("```json\n```").is_empty());
    }

    #[test]
    fn test_prompt_mentions_both_targets_and_shape() {
        let prompt = build_extraction_prompt("hello", "hi there");
        assert!(prompt.contains("USER"));
        assert!(prompt.contains("COMPANY"));
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains("User: hello"));
        assert!(prompt.contains("Assistant: hi there"));
    }
}
