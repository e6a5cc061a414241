pub mod case;
pub mod config;
pub mod llm;
pub mod models;
pub mod patient;
pub mod pipeline;
pub mod report;
pub mod rubric;
pub mod scoring;
pub mod session;
pub mod text;

pub use case::{CaseError, CaseStore};
pub use llm::{ChatMessage, ChatModel, LlmError, MockChatModel, OllamaChatClient};
pub use models::{CaseDefinition, Citation, OverallScore, Report, ReportType, TurnRole};
pub use pipeline::{CondenserBudget, InMemoryRetriever, Passage, Retriever};
pub use report::{CancelFlag, ReportComposer, ReportError};
pub use rubric::{Rubric, RubricError};
pub use scoring::score;
pub use session::{CoverageState, SessionManager, Transcript};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the engine. Library callers
/// that already install a subscriber should skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
