//! Whole-transcript rubric scoring.
//!
//! Deterministic: the same transcript and rubric always produce the same
//! `OverallScore`. No LLM, no clock, no randomness.

use crate::models::{OverallScore, SectionScore};
use crate::rubric::Rubric;
use crate::session::Transcript;

use super::evaluator::evaluate_criterion;
use super::penalty::evaluate_penalty;
use super::ScoringError;

/// Sections below this ratio are called out in the feedback summary.
const WEAK_SECTION_RATIO: f64 = 0.6;

pub fn score(transcript: &Transcript, rubric: &Rubric) -> Result<OverallScore, ScoringError> {
    if rubric.sections.is_empty() {
        return Err(ScoringError::EmptyRubric);
    }

    let user_turns: Vec<String> = transcript
        .user_contents()
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    let user_text = user_turns.join("\n");
    let full_text = transcript.full_text_lower();

    let mut section_scores = Vec::with_capacity(rubric.sections.len());
    for section in &rubric.sections {
        let criteria_scores: Vec<_> = section
            .criteria
            .iter()
            .map(|c| evaluate_criterion(c, &user_text))
            .collect();
        let penalties: Vec<_> = section
            .penalties
            .iter()
            .filter_map(|p| evaluate_penalty(p, &user_turns, &full_text))
            .collect();

        let criteria_sum: f64 = criteria_scores.iter().map(|c| c.achieved_score).sum();
        let penalty_sum: f64 = penalties.iter().map(|p| p.achieved_score).sum();
        let max_score: f64 = criteria_scores.iter().map(|c| c.max_score).sum();

        section_scores.push(SectionScore {
            section_id: section.id.clone(),
            title: section.title.clone(),
            weight: section.weight,
            max_score,
            achieved_score: (criteria_sum - penalty_sum).max(0.0),
            criteria_scores,
            penalties,
        });
    }

    let total_achieved: f64 = section_scores
        .iter()
        .map(|s| s.achieved_score * s.weight / 100.0)
        .sum();
    let total_max: f64 = section_scores
        .iter()
        .map(|s| s.max_score * s.weight / 100.0)
        .sum();
    let percentage = if total_max > 0.0 {
        100.0 * total_achieved / total_max
    } else {
        0.0
    };

    let grade = rubric.grading_scale.grade_for(percentage);
    tracing::debug!(
        percentage = format!("{percentage:.1}"),
        grade = grade.as_str(),
        "transcript scored"
    );

    Ok(OverallScore {
        total_achieved,
        total_max,
        percentage,
        grade,
        grade_description: rubric.grading_scale.label(grade).to_string(),
        detailed_feedback: feedback_summary(&section_scores),
        section_scores,
    })
}

/// Deterministic per-section summary used by the fast feedback path.
fn feedback_summary(sections: &[SectionScore]) -> String {
    let mut lines = Vec::new();
    for section in sections {
        lines.push(format!(
            "{}：{:.1}/{:.1}",
            section.title, section.achieved_score, section.max_score
        ));
        if section.ratio() < WEAK_SECTION_RATIO {
            let missed: Vec<&str> = section
                .criteria_scores
                .iter()
                .filter(|c| c.achieved_score == 0.0)
                .map(|c| c.description.as_str())
                .collect();
            if !missed.is_empty() {
                lines.push(format!("  待加強：{}", missed.join("、")));
            }
        }
        for penalty in &section.penalties {
            lines.push(format!(
                "  扣分：{}（-{:.1}）",
                penalty.description, penalty.achieved_score
            ));
        }
    }
    lines.join("\n")
}
