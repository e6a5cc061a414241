use regex::Regex;

use crate::models::Grade;

/// Grade thresholds. Ties resolve to the higher grade (`>=` comparison).
const EXCELLENT_THRESHOLD: f64 = 90.0;
const GOOD_THRESHOLD: f64 = 75.0;
const PASS_THRESHOLD: f64 = 60.0;

/// Human-readable labels per grade, from the rubric file's `grading_scale`.
#[derive(Debug, Clone)]
pub struct GradingScale {
    pub excellent: String,
    pub good: String,
    pub pass: String,
    pub fail: String,
}

impl Default for GradingScale {
    fn default() -> Self {
        Self {
            excellent: "優秀".into(),
            good: "良好".into(),
            pass: "及格".into(),
            fail: "不及格".into(),
        }
    }
}

impl GradingScale {
    /// Map a percentage to its grade. A percentage exactly on a threshold
    /// takes the higher grade.
    pub fn grade_for(&self, percentage: f64) -> Grade {
        if percentage >= EXCELLENT_THRESHOLD {
            Grade::Excellent
        } else if percentage >= GOOD_THRESHOLD {
            Grade::Good
        } else if percentage >= PASS_THRESHOLD {
            Grade::Pass
        } else {
            Grade::Fail
        }
    }

    pub fn label(&self, grade: Grade) -> &str {
        match grade {
            Grade::Excellent => &self.excellent,
            Grade::Good => &self.good,
            Grade::Pass => &self.pass,
            Grade::Fail => &self.fail,
        }
    }
}

/// An executable rubric: validated, enriched, patterns compiled.
/// Immutable after load and safely shared across sessions.
#[derive(Debug, Clone)]
pub struct Rubric {
    pub grading_scale: GradingScale,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub id: String,
    pub title: String,
    /// Contribution to the overall score, in [0, 100]. Sums to 100 across
    /// sections (validated at load).
    pub weight: f64,
    pub criteria: Vec<Criterion>,
    pub penalties: Vec<Penalty>,
}

#[derive(Debug, Clone)]
pub struct Criterion {
    pub id: String,
    pub description: String,
    pub max_score: f64,
    pub keywords: Vec<String>,
    pub patterns: Vec<Regex>,
    pub required_elements: Vec<String>,
    pub optional_elements: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Penalty {
    pub id: String,
    pub description: String,
    pub deduct_score: f64,
    pub keywords: Vec<String>,
    pub patterns: Vec<Regex>,
    /// Trigger count for repetition-style penalties.
    pub threshold: usize,
}

impl Rubric {
    pub fn section_by_id(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn criterion_by_id(&self, id: &str) -> Option<&Criterion> {
        self.all_criteria().find(|c| c.id == id)
    }

    pub fn all_criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.sections.iter().flat_map(|s| s.criteria.iter())
    }

    pub fn all_penalties(&self) -> impl Iterator<Item = &Penalty> {
        self.sections.iter().flat_map(|s| s.penalties.iter())
    }
}
