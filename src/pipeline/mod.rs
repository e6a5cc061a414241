pub mod citation;
pub mod condenser;
pub mod prompt;
pub mod queries;
pub mod retrieval;

pub use condenser::{condense, CondensedEvidence, CondenserBudget};
pub use queries::generate_queries;
pub use retrieval::{InMemoryRetriever, Passage, Retriever};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("retriever unavailable: {0}")]
    Unavailable(String),

    #[error("search failed for query {query}: {reason}")]
    Search { query: String, reason: String },
}
