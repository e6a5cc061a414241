//! Keyword and pattern matching shared by coverage tracking and rubric
//! scoring. All matching is case-insensitive over pre-lowercased text.

use regex::Regex;

/// Distinct keywords present in `text`, in keyword-list order.
///
/// `text` must already be lower-cased; keywords are lower-cased here so the
/// comparison stays symmetric for mixed-script lists.
pub fn matched_keywords<'a>(text: &str, keywords: &'a [String]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|k| !k.is_empty() && text.contains(k.to_lowercase().as_str()))
        .map(|k| k.as_str())
        .collect()
}

/// Number of distinct keywords present in `text`.
pub fn keyword_match_count(text: &str, keywords: &[String]) -> usize {
    matched_keywords(text, keywords).len()
}

/// Distinct compiled patterns that match `text`; returns the first matched
/// span of each as evidence.
pub fn matched_patterns(text: &str, patterns: &[Regex]) -> Vec<String> {
    patterns
        .iter()
        .filter_map(|p| p.find(text).map(|m| m.as_str().to_string()))
        .collect()
}

/// Total occurrences of any pattern across all texts. Used for
/// repetition-style checks where the same question asked again counts again.
pub fn pattern_occurrences(texts: &[&str], patterns: &[Regex]) -> usize {
    texts
        .iter()
        .map(|t| patterns.iter().map(|p| p.find_iter(t).count()).sum::<usize>())
        .sum()
}

fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF
    )
}

/// Contiguous runs of CJK characters, used as a last-resort keyword source
/// when neither the definition nor the playbook supplies keywords.
pub fn cjk_runs(text: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_cjk(c) {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Truncate to at most `max_chars` characters (not bytes — clinical text is
/// predominantly multi-byte).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

/// Character count, the unit every budget in this crate is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
