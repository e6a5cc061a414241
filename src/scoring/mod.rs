pub mod evaluator;
pub mod penalty;
pub mod scorer;

pub use scorer::score;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("rubric has no sections to score against")]
    EmptyRubric,
}
