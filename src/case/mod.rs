pub mod prompt;
pub mod store;

pub use prompt::build_patient_system_prompt;
pub use store::{load_case_file, CaseStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseError {
    #[error("case not found: {0}")]
    NotFound(String),

    #[error("failed to read case file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("case file {path} is malformed: {source}")]
    Load {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
