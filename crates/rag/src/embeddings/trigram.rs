//! Deterministic local embedder based on character trigrams.
//!
//! Not semantically accurate like a trained model, but produces consistent,
//! content-dependent unit vectors, which keeps the pipeline fully local and
//! makes retrieval tests reproducible.

use crate::embeddings::EmbeddingProvider;
use grounded_core::AppResult;
use std::collections::HashMap;

/// Words carrying no retrieval signal, skipped before hashing.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Local deterministic embedding provider.
pub struct TrigramEmbedder {
    dimensions: usize,
}

impl TrigramEmbedder {
    /// Create a new embedder with the specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split_whitespace()
            .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();

            // Each character trigram votes for a dimension
            for window in chars.windows(3) {
                let dim = (hash_chars(window, 37) as usize) % self.dimensions;
                embedding[dim] += (*freq as f32).sqrt();
            }

            // The whole word votes as well
            let dim = (hash_chars(&chars, 31) as usize) % self.dimensions;
            embedding[dim] += *freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

fn hash_chars(chars: &[char], seed: u64) -> u64 {
    chars.iter().fold(0u64, |acc, c| {
        acc.wrapping_mul(seed).wrapping_add(*c as u64)
    })
}

fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
