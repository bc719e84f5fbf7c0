//! Context rendering and citation deduplication.
//!
//! The context block preserves retrieval rank order; the LLM sees records in
//! the same order the index ranked them, so inline citations stay traceable
//! to rank. Citations deduplicate by `(source, locator)` in first-seen order.

use crate::types::{Citation, RetrievedRecord};
use std::collections::HashSet;

/// Render retrieved records as an indexed context block for the prompt.
pub fn format_context(records: &[RetrievedRecord]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "[{}] (Source: {}, Locator: {})\n{}",
                i + 1,
                record.source,
                record.locator,
                record.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Deduplicate records into a citation list.
///
/// At most one citation per distinct `(source, locator)` pair; the first
/// snippet seen for a key is kept.
pub fn collect_citations(records: &[RetrievedRecord]) -> Vec<Citation> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut citations = Vec::new();

    for record in records {
        let key = (record.source.clone(), record.locator.clone());
        if seen.insert(key) {
            citations.push(Citation {
                source: record.source.clone(),
                locator: record.locator.clone(),
                snippet: record.snippet.clone(),
            });
        }
    }

    citations
}

/// Build the answering prompt.
///
/// The `[Source: <source>, Locator: <locator>]` markup is the citation
/// contract the model is instructed to reproduce inline. Whether it actually
/// does is best-effort; no validation happens downstream.
pub fn build_citation_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant that answers questions based ONLY on the provided context.\n\
         If the answer cannot be found in the context, say \"I couldn't find relevant information in the indexed documents.\"\n\
         Do NOT make up information or cite sources that don't exist.\n\
         \n\
         Context (retrieved passages):\n\
         {context}\n\
         \n\
         For each fact you state, cite the source using this exact format: [Source: filename, Locator: locator]\n\
         Example: [Source: report.pdf, Locator: chunk 2]\n\
         \n\
         Question: {question}\n\
         \n\
         Answer (with inline citations):"
    )
}
