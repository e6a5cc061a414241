use std::path::PathBuf;

use serde::Serialize;

use crate::pipeline::condenser::CondenserBudget;

/// Application-level constants
pub const APP_NAME: &str = "OsceGine";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,oscegine=debug".to_string()
}

/// Get the application data directory
/// ~/OsceGine/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("OsceGine")
}

/// Get the cases directory
pub fn cases_dir() -> PathBuf {
    app_data_dir().join("cases")
}

/// Get the reports directory
pub fn reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}

/// Synthesis model deployment tier. Drives how aggressively retrieved
/// evidence is condensed before the final prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// On-device NPU model with a very tight context window.
    Npu,
    /// Small local model (laptop-class CPU/GPU).
    Constrained,
    /// Server-grade model with a generous window.
    Server,
}

/// Derive condenser budgets from the model tier.
///
/// Values assume ~1.5 chars/token for Traditional Chinese content and
/// leave roughly half the window for the transcript and rubric recap.
pub fn budget_for_tier(tier: ModelTier) -> CondenserBudget {
    match tier {
        ModelTier::Npu => CondenserBudget {
            max_context_chars: 2000,
            batch_size: 2,
            per_doc_summary_chars: 200,
            max_final_chars: 800,
        },
        ModelTier::Constrained => CondenserBudget {
            max_context_chars: 4000,
            batch_size: 4,
            per_doc_summary_chars: 300,
            max_final_chars: 1500,
        },
        ModelTier::Server => CondenserBudget {
            max_context_chars: 12000,
            batch_size: 6,
            per_doc_summary_chars: 600,
            max_final_chars: 4000,
        },
    }
}
