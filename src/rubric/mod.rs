pub mod loader;
pub mod model;
pub mod playbook;

pub use loader::{load_rubric_file, parse_rubric};
pub use model::{Criterion, GradingScale, Penalty, Rubric, Section};

use thiserror::Error;

/// Rubric loading is fatal at startup: the engine refuses to score against
/// a definition that failed validation.
#[derive(Error, Debug)]
pub enum RubricError {
    #[error("failed to read rubric file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("rubric file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("section weights sum to {sum}, expected 100 (±1)")]
    WeightSum { sum: f64 },

    #[error("criterion {criterion_id} has non-positive max score {score}")]
    NonPositiveMaxScore { criterion_id: String, score: f64 },

    #[error("penalty {penalty_id} has negative deduction {deduct}")]
    NegativeDeduct { penalty_id: String, deduct: f64 },

    #[error("invalid pattern in {id}: {source}")]
    Pattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}
