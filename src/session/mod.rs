pub mod coverage;
pub mod manager;
pub mod transcript;

pub use coverage::update_coverage;
pub use manager::SessionManager;
pub use transcript::{CoverageState, Transcript, Turn};

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),
}
