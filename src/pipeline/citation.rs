//! Citation numbering and token validation.
//!
//! Citations get dense 1-based ids in retrieval order. Narrative text
//! refers to them with literal `[citation N]` tokens; any token without a
//! matching citation is scrubbed before the report leaves the composer.

use regex::Regex;

use crate::models::Citation;

use super::retrieval::Passage;

/// Number deduplicated retrieval results into citations.
pub fn build_citations(results: Vec<(String, Passage)>) -> Vec<Citation> {
    results
        .into_iter()
        .enumerate()
        .map(|(i, (query, passage))| Citation {
            id: i + 1,
            query,
            source: passage.source,
            content: passage.content,
            score: passage.score,
        })
        .collect()
}

fn token_pattern() -> Regex {
    Regex::new(r"\[citation (\d+)\]").expect("valid citation token pattern")
}

/// All citation ids referenced by `[citation N]` tokens, in order of
/// appearance (duplicates included).
pub fn citation_token_ids(text: &str) -> Vec<usize> {
    token_pattern()
        .captures_iter(text)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect()
}

/// Remove tokens that reference a citation id outside 1..=count.
///
/// Synthesis models occasionally invent references; a dangling token would
/// break the consumer's highlighting, so they are scrubbed rather than
/// surfaced.
pub fn scrub_unknown_tokens(text: &str, citation_count: usize) -> String {
    let pattern = token_pattern();
    let mut removed = 0usize;
    let result = pattern.replace_all(text, |caps: &regex::Captures| {
        let id: usize = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        if id >= 1 && id <= citation_count {
            caps.get(0).map(|m| m.as_str()).unwrap_or("").to_string()
        } else {
            removed += 1;
            String::new()
        }
    });
    if removed > 0 {
        tracing::warn!(removed, citation_count, "scrubbed dangling citation tokens");
    }
    result.into_owned()
}

/// True when ids form the dense sequence 1..=len.
pub fn ids_are_dense(citations: &[Citation]) -> bool {
    citations.iter().enumerate().all(|(i, c)| c.id == i + 1)
}
