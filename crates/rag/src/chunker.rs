//! Section-aware text chunking with configurable size and overlap.
//!
//! Input is split on blank-line boundaries into sections. A section whose
//! first line looks like a heading (markdown marker or trailing colon)
//! updates the current section label, which tags every chunk emitted until
//! the next heading overwrites it. Words accumulate across section
//! boundaries; each emitted chunk seeds the next with its trailing overlap
//! words, so consecutive chunks share context.

use crate::types::ChunkCandidate;

/// Display width the section label is truncated to.
const SECTION_LABEL_WIDTH: usize = 80;

/// Chunk text into overlapping, section-tagged segments.
///
/// `chunk_size` is an accumulated character budget (word length plus one
/// separator per word); a chunk is emitted as soon as the budget is reached.
/// `overlap >= chunk_size` degenerates toward near-duplicate consecutive
/// chunks and is tolerated.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<ChunkCandidate> {
    let mut chunks = Vec::new();
    let mut buffer: Vec<String> = Vec::new();
    let mut buffer_len = 0usize;
    let mut next_index = 0u32;
    let mut section: Option<String> = None;

    for sec in split_sections(text) {
        if let Some(label) = heading_label(&sec) {
            section = Some(label);
        }

        for word in sec.split_whitespace() {
            buffer_len += word.chars().count() + 1;
            buffer.push(word.to_string());

            if buffer_len >= chunk_size {
                chunks.push(ChunkCandidate {
                    text: buffer.join(" "),
                    index: next_index,
                    section: section.clone(),
                });
                next_index += 1;

                // Seed the next chunk with the trailing overlap words
                if buffer.len() > overlap {
                    buffer.drain(..buffer.len() - overlap);
                }
                buffer_len = buffer.iter().map(|w| w.chars().count() + 1).sum();
            }
        }
    }

    if !buffer.is_empty() {
        chunks.push(ChunkCandidate {
            text: buffer.join(" "),
            index: next_index,
            section,
        });
    }

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

/// Split input on blank-line boundaries, trimming each section and
/// discarding empty ones.
fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.trim().lines() {
        if line.trim().is_empty() {
            flush_section(&mut sections, &mut current);
        } else {
            current.push(line);
        }
    }
    flush_section(&mut sections, &mut current);

    sections
}

fn flush_section(sections: &mut Vec<String>, current: &mut Vec<&str>) {
    if current.is_empty() {
        return;
    }
    let section = current.join("\n").trim().to_string();
    if !section.is_empty() {
        sections.push(section);
    }
    current.clear();
}

/// Extract a heading label from a section's first line, if it looks like one.
fn heading_label(section: &str) -> Option<String> {
    let first_line = section.lines().next()?;
    if first_line.starts_with('#') || first_line.ends_with(':') {
        let label: String = first_line.chars().take(SECTION_LABEL_WIDTH).collect();
        Some(label.trim().to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the original word sequence: take the first chunk whole, then
    /// for each subsequent chunk skip the words seeded from its predecessor.
    fn reconstruct(chunks: &[ChunkCandidate], overlap: usize) -> Vec<String> {
        let mut words: Vec<String> = Vec::new();
        let mut prev_word_count = 0usize;

        for chunk in chunks {
            let chunk_words: Vec<String> =
                chunk.text.split_whitespace().map(str::to_string).collect();
            let seeded = if prev_word_count == 0 {
                0
            } else {
                overlap.min(prev_word_count)
            };
            words.extend(chunk_words.iter().skip(seeded).cloned());
            prev_word_count = chunk_words.len();
        }

        words
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_text("", 100, 10).is_empty());
        assert!(chunk_text("   \n\n  \n", 100, 10).is_empty());
    }

    #[test]
    fn test_reconstruction_with_overlap_removed() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa \
                    lambda mu nu xi omicron pi rho sigma tau upsilon";
        let original: Vec<String> = text.split_whitespace().map(str::to_string).collect();

        for (chunk_size, overlap) in [(20, 3), (30, 5), (15, 1)] {
            let chunks = chunk_text(text, chunk_size, overlap);
            assert!(chunks.len() >= 2, "expected multiple chunks");
            assert_eq!(reconstruct(&chunks, overlap), original);
        }
    }

    #[test]
    fn test_indices_are_dense_across_sections() {
        let text = "First:\none two three four five\n\nSecond:\nsix seven eight nine ten\n\n\
                    Third:\neleven twelve thirteen fourteen fifteen";
        let chunks = chunk_text(text, 25, 2);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i as u32);
        }
    }

    #[test]
    fn test_markdown_heading_tags_chunks() {
        let text = "# Setup\n\nInstall the binary and run it with default settings \
                    until the index is built.";
        let chunks = chunk_text(text, 30, 2);

        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].section.as_deref(), Some("# Setup"));
    }

    #[test]
    fn test_colon_heading_tags_chunks() {
        let text = "Overview:\nThe service accepts requests and answers them with \
                    passages from the corpus.";
        let chunks = chunk_text(text, 30, 2);

        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].section.as_deref(), Some("Overview:"));
    }

    #[test]
    fn test_heading_label_persists_until_overwritten() {
        let text = "# One\n\nfirst section words here to fill the buffer quickly \
                    \n\nplain paragraph without heading\n\n# Two\n\nmore words follow here";
        let chunks = chunk_text(text, 20, 1);

        assert!(chunks.iter().any(|c| c.section.as_deref() == Some("# One")));
        assert_eq!(
            chunks.last().unwrap().section.as_deref(),
            Some("# Two"),
            "last chunk should carry the latest heading"
        );
    }

    #[test]
    fn test_heading_label_is_truncated() {
        let long_heading = format!("# {}", "x".repeat(200));
        let text = format!("{}\n\nsome body words to chunk", long_heading);
        let chunks = chunk_text(&text, 10, 1);

        let label = chunks[0].section.as_deref().unwrap();
        assert!(label.chars().count() <= SECTION_LABEL_WIDTH);
    }

    #[test]
    fn test_intro_scenario_produces_multiple_chunks() {
        let text = "Intro\n\nThe system does X. It does Y.";
        let chunks = chunk_text(text, 20, 3);

        assert!(chunks.len() >= 2);
        // "Intro" has no heading marker and no trailing colon, so chunks stay
        // untagged under the heading rules.
        assert!(chunks[0].section.is_none());
    }

    #[test]
    fn test_word_order_preserved() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk_text(text, 1000, 3);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn test_overlap_not_smaller_than_chunk_size_tolerated() {
        let text = "aa bb cc dd ee ff gg hh ii jj kk ll mm nn oo pp";
        let chunks = chunk_text(text, 12, 50);

        // Every chunk keeps its whole buffer as seed, so consecutive chunks
        // grow near-duplicate prefixes. Accepted behavior.
        assert!(chunks.len() >= 2);
        for window in chunks.windows(2) {
            assert!(window[1].text.contains(window[0].text.split(' ').next().unwrap()));
        }
    }

    #[test]
    fn test_zero_overlap_partitions_words() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk_text(text, 15, 0);
        let rebuilt = reconstruct(&chunks, 0);
        let original: Vec<String> = text.split_whitespace().map(str::to_string).collect();

        assert_eq!(rebuilt, original);
    }
}
