//! Selective conversation memory for the Grounded workspace.
//!
//! Extracts high-signal facts from single conversation turns via the LLM
//! capability and persists them to two durable, human-readable stores: one
//! user-scoped, one organization-scoped. Persistence is idempotent at the
//! fact level; a summary already stored (case-insensitively) is never
//! appended again.

pub mod extraction;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use extraction::MIN_CONFIDENCE;
pub use store::{MemoryStore, MemoryStoreConfig};
pub use types::{FactCandidate, MemoryFact, MemoryTarget};
