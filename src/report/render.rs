//! Markdown rendering from typed scoring intermediates.
//!
//! Rendering is a pure function of `OverallScore`, `CoverageState`, and the
//! case definition — tests assert against the intermediates and the exact
//! text stays easy to change.

use crate::models::{CaseDefinition, OverallScore};
use crate::rubric::playbook::resolve_keywords;
use crate::session::Transcript;
use crate::text::matched_keywords;

/// Fixed improvement guide appended to every feedback report.
const IMPROVEMENT_GUIDE: &str = "\
1. 問診依 OPQRST 順序完整收集疼痛病史。\n\
2. 主動確認危險徵象（冒汗、喘、輻射痛、暈厥）。\n\
3. 關鍵處置（如心電圖）應明確說出並交代時效。\n\
4. 以開放式問題開場，結尾摘要並確認病人理解。";

/// Status glyph by achieved/max ratio.
pub fn status_glyph(achieved: f64, max: f64) -> &'static str {
    if max <= 0.0 {
        return "❌";
    }
    let ratio = achieved / max;
    if ratio >= 0.8 {
        "✅"
    } else if ratio >= 0.5 {
        "⚠️"
    } else if ratio > 0.0 {
        "🟡"
    } else {
        "❌"
    }
}

/// Check each critical action by keyword presence over the whole transcript.
pub fn critical_action_checks(
    case: &CaseDefinition,
    transcript: &Transcript,
) -> Vec<(String, bool)> {
    let full_text = transcript.full_text_lower();
    case.critical_actions()
        .iter()
        .map(|action| {
            let keywords = resolve_keywords(&action.id, &action.keywords, &action.description);
            let done = !matched_keywords(&full_text, &keywords).is_empty();
            (action.description.clone(), done)
        })
        .collect()
}

/// The fast feedback document. `score` is `None` when rubric scoring
/// failed — the coverage sections still render in full.
pub fn render_feedback(
    score: Option<&OverallScore>,
    transcript: &Transcript,
    case: &CaseDefinition,
) -> String {
    let coverage = transcript.coverage();
    let mut doc = String::new();

    doc.push_str(&format!("# 回饋報告 — {}\n\n", case.case_id));

    match score {
        Some(score) => {
            doc.push_str(&format!(
                "**總分**：{:.1}%（{}）\n",
                score.percentage, score.grade_description
            ));
        }
        None => {
            doc.push_str("**總分**：無法計算（僅提供涵蓋率摘要）\n");
        }
    }
    doc.push_str(&format!("**涵蓋率**：{}%\n\n", coverage.coverage_pct));

    if let Some(score) = score {
        doc.push_str("## 評分項目\n\n");
        for section in &score.section_scores {
            doc.push_str(&format!(
                "### {}（{:.1}/{:.1}）\n",
                section.title, section.achieved_score, section.max_score
            ));
            for criterion in &section.criteria_scores {
                doc.push_str(&format!(
                    "- {} {}（{:.1}/{:.1}）\n",
                    status_glyph(criterion.achieved_score, criterion.max_score),
                    criterion.description,
                    criterion.achieved_score,
                    criterion.max_score
                ));
            }
            for penalty in &section.penalties {
                doc.push_str(&format!(
                    "- ❗ {}（-{:.1}）\n",
                    penalty.description, penalty.achieved_score
                ));
            }
            doc.push('\n');
        }
    }

    doc.push_str("## 檢查清單涵蓋\n\n");
    for item in case.checklist() {
        let glyph = if coverage.covered_ids.contains(&item.id) {
            "✅"
        } else if coverage.partial_ids.contains(&item.id) {
            "🟡"
        } else {
            "❌"
        };
        doc.push_str(&format!("- {glyph} {}\n", item.point));
    }
    doc.push('\n');

    if !case.critical_actions().is_empty() {
        doc.push_str("## 關鍵處置\n\n");
        for (description, done) in critical_action_checks(case, transcript) {
            let glyph = if done { "✅" } else { "❌" };
            doc.push_str(&format!("- {glyph} {description}\n"));
        }
        doc.push('\n');
    }

    doc.push_str("## 改進建議\n\n");
    doc.push_str(IMPROVEMENT_GUIDE);
    doc.push('\n');

    if let Some(score) = score {
        if !score.detailed_feedback.is_empty() {
            doc.push_str("\n## 分項回饋\n\n");
            doc.push_str(&score.detailed_feedback);
            doc.push('\n');
        }
    }

    doc
}

/// Fallback document for the detailed path when synthesis is unavailable:
/// the preliminary feedback plus the condensed evidence verbatim.
pub fn render_detailed_fallback(preliminary: &str, evidence: &str) -> String {
    let mut doc = String::new();
    doc.push_str(preliminary);
    if !evidence.is_empty() {
        doc.push_str("\n## 證據摘要\n\n");
        doc.push_str(evidence);
        doc.push('\n');
    }
    doc
}

/// Error section appended when generation hits an unanticipated failure —
/// surfaced in the document, never silently dropped.
pub fn render_error_section(detail: &str) -> String {
    format!("\n## 產生報告時發生錯誤\n\n{detail}\n")
}
