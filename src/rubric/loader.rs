//! Rubric file parsing, validation, and enrichment.
//!
//! The on-disk shape follows the authoring schema (`desc`, `score`,
//! `deduct`); the compiled [`Rubric`] carries enriched keyword lists and
//! pre-compiled patterns so scoring never touches the parser again.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use super::model::{Criterion, GradingScale, Penalty, Rubric, Section};
use super::playbook::resolve_keywords;
use super::RubricError;

/// Allowed rounding slack when checking that section weights sum to 100.
const WEIGHT_SUM_TOLERANCE: f64 = 1.0;

/// Penalty trigger count when the file omits `threshold`.
const DEFAULT_PENALTY_THRESHOLD: usize = 2;

#[derive(Debug, Deserialize)]
struct RubricFile {
    rubric: RubricBody,
}

#[derive(Debug, Deserialize)]
struct RubricBody {
    #[serde(default)]
    grading_scale: Option<GradingScaleFile>,
    sections: Vec<SectionFile>,
}

#[derive(Debug, Deserialize)]
struct GradingScaleFile {
    excellent: String,
    good: String,
    pass: String,
    fail: String,
}

#[derive(Debug, Deserialize)]
struct SectionFile {
    id: String,
    title: String,
    weight: f64,
    #[serde(default)]
    criteria: Vec<CriterionFile>,
    #[serde(default)]
    penalties: Vec<PenaltyFile>,
}

#[derive(Debug, Deserialize)]
struct CriterionFile {
    id: String,
    desc: String,
    score: f64,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    patterns: Vec<String>,
    #[serde(default)]
    required_elements: Vec<String>,
    #[serde(default)]
    optional_elements: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PenaltyFile {
    id: String,
    desc: String,
    deduct: f64,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    patterns: Vec<String>,
    #[serde(default)]
    threshold: Option<usize>,
}

/// Load and compile a rubric from a YAML file.
pub fn load_rubric_file(path: &Path) -> Result<Rubric, RubricError> {
    let raw = std::fs::read_to_string(path).map_err(|source| RubricError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_rubric(&raw)
}

/// Parse, validate, and enrich a rubric from YAML text.
pub fn parse_rubric(yaml: &str) -> Result<Rubric, RubricError> {
    let file: RubricFile = serde_yaml::from_str(yaml)?;
    compile(file.rubric)
}

fn compile(body: RubricBody) -> Result<Rubric, RubricError> {
    let weight_sum: f64 = body.sections.iter().map(|s| s.weight).sum();
    if (weight_sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(RubricError::WeightSum { sum: weight_sum });
    }

    let grading_scale = body
        .grading_scale
        .map(|g| GradingScale {
            excellent: g.excellent,
            good: g.good,
            pass: g.pass,
            fail: g.fail,
        })
        .unwrap_or_default();

    let mut sections = Vec::with_capacity(body.sections.len());
    for section in body.sections {
        let mut criteria = Vec::with_capacity(section.criteria.len());
        for c in section.criteria {
            if c.score <= 0.0 {
                return Err(RubricError::NonPositiveMaxScore {
                    criterion_id: c.id,
                    score: c.score,
                });
            }
            let keywords = resolve_keywords(&c.id, &c.keywords, &c.desc);
            if keywords.is_empty() {
                tracing::warn!(criterion = %c.id, "criterion has no usable keywords");
            }
            criteria.push(Criterion {
                patterns: compile_patterns(&c.id, &c.patterns)?,
                keywords,
                id: c.id,
                description: c.desc,
                max_score: c.score,
                required_elements: c.required_elements,
                optional_elements: c.optional_elements,
            });
        }

        let mut penalties = Vec::with_capacity(section.penalties.len());
        for p in section.penalties {
            if p.deduct < 0.0 {
                return Err(RubricError::NegativeDeduct {
                    penalty_id: p.id,
                    deduct: p.deduct,
                });
            }
            penalties.push(Penalty {
                patterns: compile_patterns(&p.id, &p.patterns)?,
                keywords: resolve_keywords(&p.id, &p.keywords, &p.desc),
                id: p.id,
                description: p.desc,
                deduct_score: p.deduct,
                threshold: p.threshold.unwrap_or(DEFAULT_PENALTY_THRESHOLD),
            });
        }

        sections.push(Section {
            id: section.id,
            title: section.title,
            weight: section.weight,
            criteria,
            penalties,
        });
    }

    Ok(Rubric {
        grading_scale,
        sections,
    })
}

fn compile_patterns(id: &str, patterns: &[String]) -> Result<Vec<Regex>, RubricError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| RubricError::Pattern {
                id: id.to_string(),
                source,
            })
        })
        .collect()
}
