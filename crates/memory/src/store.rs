//! Durable, deduplicating memory stores.
//!
//! One line-oriented markdown document per target, appended to and never
//! rewritten. Each fact is a single dash-prefixed line; operators may
//! hand-edit the documents, so re-parsing tolerates arbitrary surrounding
//! whitespace, blank lines, and non-dash header lines.
//!
//! The read-dedup-append sequence is a read-modify-write over shared durable
//! state. In-process callers are serialized by a store-wide mutex;
//! cross-process writers remain an accepted race under single-session use.

use crate::extraction;
use crate::types::{FactCandidate, MemoryFact, MemoryTarget};
use grounded_core::{AppError, AppResult};
use grounded_llm::LlmClient;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Locations of the per-target store documents.
///
/// Paths are explicit constructor configuration so isolated stores can
/// coexist and tests can use ephemeral directories.
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// User-scoped store document
    pub user_path: PathBuf,

    /// Organization-scoped store document
    pub company_path: PathBuf,
}

impl MemoryStoreConfig {
    /// Conventional store documents inside a directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            user_path: dir.join("USER_MEMORY.md"),
            company_path: dir.join("COMPANY_MEMORY.md"),
        }
    }
}

/// Append-only fact store covering both memory targets.
pub struct MemoryStore {
    config: MemoryStoreConfig,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create a store over the given document paths.
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Process one conversation turn: extract candidates, deduplicate, and
    /// append. Returns exactly the facts newly written by this call, in
    /// candidate order.
    ///
    /// `client` is `None` when no LLM capability is configured; that yields
    /// zero candidates and is not an error.
    pub async fn process_turn(
        &self,
        client: Option<&dyn LlmClient>,
        model: &str,
        user_message: &str,
        assistant_message: &str,
    ) -> AppResult<Vec<MemoryFact>> {
        let candidates = match client {
            Some(client) => {
                extraction::extract_candidates(client, model, user_message, assistant_message)
                    .await
            }
            None => {
                tracing::debug!("No LLM configured; extracting zero memory candidates");
                Vec::new()
            }
        };

        self.record_candidates(candidates)
    }

    /// Deduplicate candidates against the persisted stores and append the
    /// novel ones. Within-call duplicates are suppressed as well.
    pub fn record_candidates(&self, candidates: Vec<FactCandidate>) -> AppResult<Vec<MemoryFact>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Memory("memory store lock poisoned".to_string()))?;

        let mut existing_user = self.existing_summaries(MemoryTarget::User)?;
        let mut existing_company = self.existing_summaries(MemoryTarget::Company)?;

        let mut written = Vec::new();

        for candidate in candidates {
            let Some(target) = MemoryTarget::parse(&candidate.target) else {
                tracing::debug!("Dropping candidate with unrecognized target: {:?}", candidate.target);
                continue;
            };

            let summary = candidate.summary.trim();
            if summary.is_empty() {
                continue;
            }

            let existing = match target {
                MemoryTarget::User => &mut existing_user,
                MemoryTarget::Company => &mut existing_company,
            };

            let key = summary.to_lowercase();
            if existing.contains(&key) {
                tracing::debug!("Skipping already-stored fact: {}", summary);
                continue;
            }

            self.append_fact(target, summary)?;
            existing.insert(key);
            written.push(MemoryFact {
                target,
                summary: summary.to_string(),
            });
        }

        if !written.is_empty() {
            tracing::info!("Persisted {} new memory fact(s)", written.len());
        }

        Ok(written)
    }

    /// Load a target's store as a context string for prompt injection.
    /// A missing document reads as empty.
    pub fn load_for_context(&self, target: MemoryTarget) -> AppResult<String> {
        let path = self.path_for(target);
        if !path.exists() {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(path)?.trim().to_string())
    }

    fn path_for(&self, target: MemoryTarget) -> &Path {
        match target {
            MemoryTarget::User => &self.config.user_path,
            MemoryTarget::Company => &self.config.company_path,
        }
    }

    /// Rebuild the dedup set from a store document. Only dash-prefixed lines
    /// count; headers and blank lines are ignored and whitespace is trimmed.
    fn existing_summaries(&self, target: MemoryTarget) -> AppResult<HashSet<String>> {
        let path = self.path_for(target);
        if !path.exists() {
            return Ok(HashSet::new());
        }

        let content = fs::read_to_string(path)?;
        let summaries = content
            .lines()
            .filter_map(|line| {
                let trimmed = line.trim();
                trimmed
                    .strip_prefix('-')
                    .map(|rest| rest.trim().to_lowercase())
            })
            .filter(|s| !s.is_empty())
            .collect();

        Ok(summaries)
    }

    /// Append one fact line to a target's store document.
    fn append_fact(&self, target: MemoryTarget, summary: &str) -> AppResult<()> {
        let path = self.path_for(target);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "- {}", summary)?;

        tracing::debug!("Appended fact to {} store: {}", target.as_str(), summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(target: &str, summary: &str, confidence: f64) -> FactCandidate {
        FactCandidate {
            target: target.to_string(),
            summary: summary.to_string(),
            confidence,
        }
    }

    fn store_in(dir: &Path) -> MemoryStore {
        MemoryStore::new(MemoryStoreConfig::in_dir(dir))
    }

    #[test]
    fn test_one_fact_per_target_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let written = store
            .record_candidates(vec![
                candidate("USER", "Prefers Mondays", 0.9),
                candidate("COMPANY", "Team X owns Y", 0.95),
            ])
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0].target, MemoryTarget::User);
        assert_eq!(written[1].target, MemoryTarget::Company);

        let user = fs::read_to_string(dir.path().join("USER_MEMORY.md")).unwrap();
        let company = fs::read_to_string(dir.path().join("COMPANY_MEMORY.md")).unwrap();
        assert_eq!(user, "- Prefers Mondays\n");
        assert_eq!(company, "- Team X owns Y\n");
    }

    #[test]
    fn test_repeated_fact_appends_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let first = store
            .record_candidates(vec![candidate("USER", "Prefers Mondays", 0.9)])
            .unwrap();
        let second = store
            .record_candidates(vec![candidate("USER", "Prefers Mondays", 0.9)])
            .unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());

        let content = fs::read_to_string(dir.path().join("USER_MEMORY.md")).unwrap();
        assert_eq!(content.matches("Prefers Mondays").count(), 1);
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("USER_MEMORY.md"), "- Likes Mondays\n").unwrap();
        let store = store_in(dir.path());

        let written = store
            .record_candidates(vec![candidate("USER", "likes mondays", 0.9)])
            .unwrap();

        assert!(written.is_empty());
    }

    #[test]
    fn test_within_call_duplicates_suppressed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let written = store
            .record_candidates(vec![
                candidate("USER", "Works remotely", 0.9),
                candidate("USER", "works remotely", 0.85),
            ])
            .unwrap();

        assert_eq!(written.len(), 1);
    }

    #[test]
    fn test_unrecognized_target_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let written = store
            .record_candidates(vec![
                candidate("TEAM", "Belongs nowhere", 0.9),
                candidate("company", "Lowercase tag still lands", 0.9),
            ])
            .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0].target, MemoryTarget::Company);
        assert!(!dir.path().join("USER_MEMORY.md").exists());
    }

    #[test]
    fn test_blank_summary_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let written = store
            .record_candidates(vec![candidate("USER", "   ", 0.9)])
            .unwrap();

        assert!(written.is_empty());
    }

    #[test]
    fn test_hand_edited_store_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("COMPANY_MEMORY.md"),
            "# Company memory\n\n  - Finance owns reporting.  \n\nnot a fact line\n- second fact\n",
        )
        .unwrap();
        let store = store_in(dir.path());

        let written = store
            .record_candidates(vec![
                candidate("COMPANY", "finance owns reporting.", 0.9),
                candidate("COMPANY", "Second Fact", 0.9),
                candidate("COMPANY", "A genuinely new fact", 0.9),
            ])
            .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0].summary, "A genuinely new fact");
    }

    #[test]
    fn test_load_for_context() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        assert_eq!(store.load_for_context(MemoryTarget::User).unwrap(), "");

        fs::write(dir.path().join("USER_MEMORY.md"), "- Fact one\n- Fact two\n").unwrap();
        let context = store.load_for_context(MemoryTarget::User).unwrap();
        assert_eq!(context, "- Fact one\n- Fact two");
    }

    mod process_turn {
        use super::*;
        use grounded_llm::{LlmError, LlmRequest, LlmResponse, LlmResult, LlmUsage};

        /// Stub client returning a canned completion.
        struct StaticClient {
            reply: Result<String, ()>,
        }

        #[async_trait::async_trait]
        impl LlmClient for StaticClient {
            fn provider_name(&self) -> &str {
                "static"
            }

            async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
                match &self.reply {
                    Ok(content) => Ok(LlmResponse {
                        content: content.clone(),
                        model: request.model.clone(),
                        usage: LlmUsage::default(),
                    }),
                    Err(()) => Err(LlmError::Transient("boom".to_string())),
                }
            }
        }

        #[tokio::test]
        async fn test_turn_with_extractable_facts() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(dir.path());
            let client = StaticClient {
                reply: Ok("```json\n[{\"target\": \"USER\", \"summary\": \"Prefers weekly summaries\", \"confidence\": 0.9}]\n```".to_string()),
            };

            let written = store
                .process_turn(Some(&client), "llama3.2", "send me summaries weekly", "will do")
                .await
                .unwrap();

            assert_eq!(written.len(), 1);
            assert_eq!(written[0].summary, "Prefers weekly summaries");
        }

        #[tokio::test]
        async fn test_turn_without_client_writes_nothing() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(dir.path());

            let written = store
                .process_turn(None, "llama3.2", "hello", "hi")
                .await
                .unwrap();

            assert!(written.is_empty());
            assert!(!dir.path().join("USER_MEMORY.md").exists());
        }

        #[tokio::test]
        async fn test_turn_with_failing_client_writes_nothing() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(dir.path());
            let client = StaticClient { reply: Err(()) };

            let written = store
                .process_turn(Some(&client), "llama3.2", "hello", "hi")
                .await
                .unwrap();

            assert!(written.is_empty());
        }

        #[tokio::test]
        async fn test_turn_with_garbage_reply_writes_nothing() {
            let dir = tempfile::tempdir().unwrap();
            let store = store_in(dir.path());
            let client = StaticClient {
                reply: Ok("nothing to remember, have a nice day".to_string()),
            };

            let written = store
                .process_turn(Some(&client), "llama3.2", "hello", "hi")
                .await
                .unwrap();

            assert!(written.is_empty());
        }
    }
}
