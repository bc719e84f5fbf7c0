//! Memory system type definitions.

use serde::{Deserialize, Serialize};

/// Scope a durable fact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemoryTarget {
    User,
    Company,
}

impl MemoryTarget {
    /// Parse a target tag case-insensitively. Unrecognized tags yield `None`
    /// and the candidate carrying them is dropped.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "USER" => Some(Self::User),
            "COMPANY" => Some(Self::Company),
            _ => None,
        }
    }

    /// Canonical tag string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Company => "COMPANY",
        }
    }
}

/// A fact candidate as extracted by the LLM, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct FactCandidate {
    /// Target tag as returned by the model ("USER" / "COMPANY")
    #[serde(default)]
    pub target: String,

    /// Human-readable fact statement
    #[serde(default)]
    pub summary: String,

    /// Extraction confidence, 0.0-1.0; only used at filter time
    #[serde(default)]
    pub confidence: f64,
}

/// A durably persisted fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFact {
    /// Store the fact was appended to
    pub target: MemoryTarget,

    /// Fact statement as written
    pub summary: String,
}
