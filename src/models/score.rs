use serde::{Deserialize, Serialize};

use super::enums::Grade;

/// Score for a single criterion (or a triggered penalty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_id: String,
    pub description: String,
    pub max_score: f64,
    pub achieved_score: f64,
    /// Concrete matched strings backing the score. Bounded at evaluation time.
    pub evidence: Vec<String>,
    pub is_penalty: bool,
}

/// Aggregated scores for one rubric section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionScore {
    pub section_id: String,
    pub title: String,
    pub weight: f64,
    pub max_score: f64,
    /// Criteria sum minus penalty sum, floored at 0.
    pub achieved_score: f64,
    pub criteria_scores: Vec<CriterionScore>,
    pub penalties: Vec<CriterionScore>,
}

/// The complete rubric result for a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallScore {
    pub total_achieved: f64,
    pub total_max: f64,
    pub percentage: f64,
    pub grade: Grade,
    pub grade_description: String,
    pub section_scores: Vec<SectionScore>,
    pub detailed_feedback: String,
}

impl SectionScore {
    /// Fraction achieved in [0, 1]; 0 when the section has no scoreable max.
    pub fn ratio(&self) -> f64 {
        if self.max_score > 0.0 {
            self.achieved_score / self.max_score
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_ratio_handles_zero_max() {
        let section = SectionScore {
            section_id: "empty".into(),
            title: "Empty".into(),
            weight: 10.0,
            max_score: 0.0,
            achieved_score: 0.0,
            criteria_scores: vec![],
            penalties: vec![],
        };
        assert_eq!(section.ratio(), 0.0);
    }

    #[test]
    fn section_ratio_divides() {
        let section = SectionScore {
            section_id: "history".into(),
            title: "病史詢問".into(),
            weight: 40.0,
            max_score: 10.0,
            achieved_score: 8.0,
            criteria_scores: vec![],
            penalties: vec![],
        };
        assert!((section.ratio() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn overall_score_serializes() {
        let score = OverallScore {
            total_achieved: 7.1,
            total_max: 10.0,
            percentage: 71.0,
            grade: Grade::Pass,
            grade_description: "及格".into(),
            section_scores: vec![],
            detailed_feedback: String::new(),
        };
        let json = serde_json::to_string(&score).unwrap();
        assert!(json.contains("\"pass\""));
        assert!(json.contains("71.0"));
    }
}
