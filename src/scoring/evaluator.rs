//! Per-criterion evaluation.
//!
//! A criterion id with a dedicated evaluator (`intro`, `opqrst`) takes
//! precedence; everything else goes through the generic weighted evaluator.
//! All evaluation runs over the lower-cased, joined student turns, so the
//! result depends only on what the student actually said.

use crate::models::CriterionScore;
use crate::rubric::Criterion;
use crate::text::{matched_keywords, matched_patterns};

/// Evidence bounds: all required matches, top keywords, top patterns.
const EVIDENCE_KEYWORDS: usize = 3;
const EVIDENCE_PATTERNS: usize = 2;

/// Points per distinct matched pattern for the `opqrst` evaluator.
const OPQRST_POINTS_PER_DIMENSION: f64 = 2.0;

pub fn evaluate_criterion(criterion: &Criterion, user_text: &str) -> CriterionScore {
    match criterion.id.as_str() {
        "intro" => evaluate_intro(criterion, user_text),
        "opqrst" => evaluate_opqrst(criterion, user_text),
        _ => evaluate_generic(criterion, user_text),
    }
}

/// Introduction: full marks need every required element plus broad keyword
/// presence; a partial greeting earns half.
fn evaluate_intro(criterion: &Criterion, text: &str) -> CriterionScore {
    let required = matched_required(criterion, text);
    let keywords = matched_keywords(text, &criterion.keywords);

    let all_required = required.len() == criterion.required_elements.len();
    let achieved = if all_required && keywords.len() >= 3 {
        criterion.max_score
    } else if !required.is_empty() && keywords.len() >= 2 {
        criterion.max_score / 2.0
    } else {
        0.0
    };

    let mut evidence = required;
    evidence.extend(
        keywords
            .iter()
            .take(EVIDENCE_KEYWORDS)
            .map(|k| k.to_string()),
    );

    build_score(criterion, achieved, evidence)
}

/// Pain-history mnemonic: each distinct dimension pattern that matched
/// contributes a fixed number of points, capped at the criterion max.
fn evaluate_opqrst(criterion: &Criterion, text: &str) -> CriterionScore {
    let spans = matched_patterns(text, &criterion.patterns);
    let achieved = (spans.len() as f64 * OPQRST_POINTS_PER_DIMENSION).min(criterion.max_score);

    build_score(criterion, achieved, spans)
}

fn evaluate_generic(criterion: &Criterion, text: &str) -> CriterionScore {
    let required = matched_required(criterion, text);
    let keywords = matched_keywords(text, &criterion.keywords);
    let patterns = matched_patterns(text, &criterion.patterns);
    let optional = criterion
        .optional_elements
        .iter()
        .filter(|e| text.contains(e.to_lowercase().as_str()))
        .count();

    let k = keywords.len();
    let p = patterns.len();

    let required_term = if criterion.required_elements.is_empty() {
        // Vacuously complete — but an otherwise silent transcript earns
        // nothing, so the term only counts alongside some other signal.
        if k + p + optional > 0 {
            0.6
        } else {
            0.0
        }
    } else {
        let fraction = required.len() as f64 / criterion.required_elements.len() as f64;
        if fraction >= 1.0 {
            0.6
        } else if fraction > 0.0 {
            0.3
        } else {
            0.0
        }
    };

    let keyword_term = match k {
        0 => 0.0,
        1 => 0.1,
        2 => 0.2,
        _ => 0.3,
    };
    let pattern_term = match p {
        0 => 0.0,
        1 => 0.1,
        _ => 0.2,
    };
    let optional_term = if optional >= 2 { 0.1 } else { 0.0 };

    let achieved = (criterion.max_score
        * (required_term + keyword_term + pattern_term + optional_term))
        .min(criterion.max_score);

    let mut evidence = required;
    evidence.extend(
        keywords
            .iter()
            .take(EVIDENCE_KEYWORDS)
            .map(|k| k.to_string()),
    );
    evidence.extend(patterns.into_iter().take(EVIDENCE_PATTERNS));

    build_score(criterion, achieved, evidence)
}

fn matched_required(criterion: &Criterion, text: &str) -> Vec<String> {
    criterion
        .required_elements
        .iter()
        .filter(|e| text.contains(e.to_lowercase().as_str()))
        .cloned()
        .collect()
}

fn build_score(criterion: &Criterion, achieved: f64, evidence: Vec<String>) -> CriterionScore {
    CriterionScore {
        criterion_id: criterion.id.clone(),
        description: criterion.description.clone(),
        max_score: criterion.max_score,
        achieved_score: achieved,
        evidence,
        is_penalty: false,
    }
}
