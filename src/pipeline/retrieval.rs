//! Retrieval contract and helpers.
//!
//! The vector store itself is an external collaborator; the engine only
//! depends on `search(query, k) → passages`. An in-memory implementation
//! with keyword-overlap scoring ships for tests and offline runs.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::text::cjk_runs;

use super::RetrievalError;

/// A ranked passage returned by the retriever.
#[derive(Debug, Clone)]
pub struct Passage {
    pub source: String,
    pub content: String,
    pub score: Option<f32>,
}

/// Document search abstraction (allows mocking).
pub trait Retriever {
    fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError>;
}

/// Passage-prefix length used when deduplicating near-identical results
/// retrieved by different queries.
const DEDUPE_PREFIX_CHARS: usize = 120;

/// Drop passages whose content prefix hashes equal an earlier passage's.
/// Order (and therefore citation numbering) of first occurrences is kept.
pub fn dedupe_passages(results: Vec<(String, Passage)>) -> Vec<(String, Passage)> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::with_capacity(results.len());
    for (query, passage) in results {
        let prefix: String = passage.content.chars().take(DEDUPE_PREFIX_CHARS).collect();
        let mut hasher = DefaultHasher::new();
        prefix.hash(&mut hasher);
        if seen.insert(hasher.finish()) {
            deduped.push((query, passage));
        } else {
            tracing::debug!(source = %passage.source, "duplicate passage dropped");
        }
    }
    deduped
}

/// In-memory retriever scoring by query-term overlap.
pub struct InMemoryRetriever {
    docs: Vec<(String, String)>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self { docs: Vec::new() }
    }

    pub fn add(&mut self, source: &str, content: &str) {
        self.docs.push((source.to_string(), content.to_string()));
    }

    fn query_terms(query: &str) -> Vec<String> {
        let lower = query.to_lowercase();
        let mut terms: Vec<String> = lower
            .split_whitespace()
            .filter(|w| w.chars().count() >= 3 && w.is_ascii())
            .map(String::from)
            .collect();
        terms.extend(cjk_runs(&lower));
        terms
    }
}

impl Default for InMemoryRetriever {
    fn default() -> Self {
        Self::new()
    }
}

impl Retriever for InMemoryRetriever {
    fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let terms = Self::query_terms(query);
        if terms.is_empty() {
            return Ok(vec![]);
        }

        let mut scored: Vec<Passage> = self
            .docs
            .iter()
            .filter_map(|(source, content)| {
                let lower = content.to_lowercase();
                let hits = terms.iter().filter(|t| lower.contains(t.as_str())).count();
                if hits == 0 {
                    return None;
                }
                Some(Passage {
                    source: source.clone(),
                    content: content.clone(),
                    score: Some(hits as f32 / terms.len() as f32),
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}
