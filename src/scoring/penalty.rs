//! Penalty detection.
//!
//! Penalties examine the student's turns (and, for red-flag omissions, the
//! whole transcript) and emit a deduction entry when triggered. Like the
//! criterion ids, a penalty id with a dedicated detector takes precedence.

use crate::models::CriterionScore;
use crate::rubric::Penalty;
use crate::text::{matched_keywords, pattern_occurrences};

/// Distinct off-topic keyword hits that trigger `irrelevant`.
const IRRELEVANT_THRESHOLD: usize = 2;

/// Evaluate one penalty. `user_turns` are the lower-cased student turns in
/// order; `full_text` is the lower-cased whole transcript.
pub fn evaluate_penalty(
    penalty: &Penalty,
    user_turns: &[String],
    full_text: &str,
) -> Option<CriterionScore> {
    let joined = user_turns.join("\n");

    match penalty.id.as_str() {
        "irrelevant" => irrelevant(penalty, &joined),
        "repeated" => repeated(penalty, user_turns),
        "missed_red_flag" => missed_red_flag(penalty, full_text),
        _ => generic(penalty, &joined, user_turns),
    }
}

/// Off-topic questioning: two or more distinct off-topic keywords.
fn irrelevant(penalty: &Penalty, joined: &str) -> Option<CriterionScore> {
    let matched = matched_keywords(joined, &penalty.keywords);
    if matched.len() >= IRRELEVANT_THRESHOLD {
        let evidence = matched.iter().map(|k| k.to_string()).collect();
        return Some(triggered(penalty, evidence));
    }
    None
}

/// The same question asked over and over: total pattern occurrences across
/// the student's turns reach the configured threshold.
fn repeated(penalty: &Penalty, user_turns: &[String]) -> Option<CriterionScore> {
    let turns: Vec<&str> = user_turns.iter().map(|s| s.as_str()).collect();
    let occurrences = pattern_occurrences(&turns, &penalty.patterns);
    if occurrences >= penalty.threshold.max(1) {
        return Some(triggered(
            penalty,
            vec![format!("重複出現 {occurrences} 次")],
        ));
    }
    None
}

/// Red-flag omission: none of the red-flag keywords appear anywhere in the
/// transcript. An empty keyword set never triggers.
fn missed_red_flag(penalty: &Penalty, full_text: &str) -> Option<CriterionScore> {
    if penalty.keywords.is_empty() {
        return None;
    }
    if matched_keywords(full_text, &penalty.keywords).is_empty() {
        let evidence = penalty
            .keywords
            .iter()
            .take(3)
            .map(|k| format!("未提及：{k}"))
            .collect();
        return Some(triggered(penalty, evidence));
    }
    None
}

/// Fallback detector: distinct keyword hits or total pattern occurrences
/// reaching the threshold.
fn generic(penalty: &Penalty, joined: &str, user_turns: &[String]) -> Option<CriterionScore> {
    let threshold = penalty.threshold.max(1);

    let matched = matched_keywords(joined, &penalty.keywords);
    if !penalty.keywords.is_empty() && matched.len() >= threshold {
        let evidence = matched.iter().map(|k| k.to_string()).collect();
        return Some(triggered(penalty, evidence));
    }

    if !penalty.patterns.is_empty() {
        let turns: Vec<&str> = user_turns.iter().map(|s| s.as_str()).collect();
        let occurrences = pattern_occurrences(&turns, &penalty.patterns);
        if occurrences >= threshold {
            return Some(triggered(
                penalty,
                vec![format!("出現 {occurrences} 次")],
            ));
        }
    }

    None
}

fn triggered(penalty: &Penalty, evidence: Vec<String>) -> CriterionScore {
    CriterionScore {
        criterion_id: penalty.id.clone(),
        description: penalty.description.clone(),
        max_score: 0.0,
        achieved_score: penalty.deduct_score,
        evidence,
        is_penalty: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn penalty(id: &str, deduct: f64) -> Penalty {
        Penalty {
            id: id.into(),
            description: format!("penalty {id}"),
            deduct_score: deduct,
            keywords: vec![],
            patterns: vec![],
            threshold: 2,
        }
    }

    fn turns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_lowercase()).collect()
    }

    #[test]
    fn irrelevant_needs_two_distinct_hits() {
        let mut p = penalty("irrelevant", 2.0);
        p.keywords = vec!["天氣".into(), "股票".into(), "政治".into()];

        let one = turns(&["今天天氣真好"]);
        assert!(evaluate_penalty(&p, &one, "今天天氣真好").is_none());

        let two = turns(&["今天天氣真好", "你有買股票嗎"]);
        let score = evaluate_penalty(&p, &two, "").unwrap();
        assert_eq!(score.achieved_score, 2.0);
        assert!(score.is_penalty);
        assert_eq!(score.evidence, vec!["天氣".to_string(), "股票".to_string()]);
    }

    #[test]
    fn repeated_counts_occurrences_across_turns() {
        let mut p = penalty("repeated", 2.0);
        p.patterns = vec![Regex::new(r"哪裡.{0,4}痛").unwrap()];
        p.threshold = 3;

        let twice = turns(&["哪裡會痛？", "所以哪裡會痛？"]);
        assert!(evaluate_penalty(&p, &twice, "").is_none());

        let thrice = turns(&["哪裡會痛？", "所以哪裡會痛？", "到底哪裡會痛？"]);
        let score = evaluate_penalty(&p, &thrice, "").unwrap();
        assert_eq!(score.achieved_score, 2.0);
    }

    #[test]
    fn missed_red_flag_triggers_on_total_absence() {
        let mut p = penalty("missed_red_flag", 3.0);
        p.keywords = vec!["冒汗".into(), "喘".into(), "暈".into()];

        let score = evaluate_penalty(&p, &turns(&["哪裡痛？"]), "哪裡痛？ 胸口。").unwrap();
        assert_eq!(score.achieved_score, 3.0);
        assert!(score.evidence[0].contains("冒汗"));
    }

    #[test]
    fn missed_red_flag_checks_whole_transcript() {
        let mut p = penalty("missed_red_flag", 3.0);
        p.keywords = vec!["冒汗".into()];

        // The patient mentioned sweating — the flag surfaced in the
        // conversation, so the omission penalty does not apply.
        let full = "哪裡痛？\n胸口，而且一直冒汗。";
        assert!(evaluate_penalty(&p, &turns(&["哪裡痛？"]), full).is_none());
    }

    #[test]
    fn missed_red_flag_without_keywords_never_triggers() {
        let p = penalty("missed_red_flag", 3.0);
        assert!(evaluate_penalty(&p, &turns(&[]), "").is_none());
    }

    #[test]
    fn generic_penalty_uses_threshold() {
        let mut p = penalty("jargon", 1.0);
        p.keywords = vec!["心肌鈣蛋白".into(), "st 段".into(), "q 波".into()];
        p.threshold = 2;

        let one = turns(&["我們會檢查心肌鈣蛋白"]);
        assert!(evaluate_penalty(&p, &one, "").is_none());

        let two = turns(&["我們會檢查心肌鈣蛋白和 st 段變化"]);
        assert!(evaluate_penalty(&p, &two, "").is_some());
    }

    #[test]
    fn untriggered_penalty_returns_none() {
        let p = penalty("empty", 5.0);
        assert!(evaluate_penalty(&p, &turns(&["anything"]), "anything").is_none());
    }
}
