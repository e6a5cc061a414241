//! Report generation orchestrator.
//!
//! Coordinates: score → queries → retrieve → condense → synthesize.
//! Phases run strictly in sequence; the cancellation flag is checked
//! between them. Every LLM or retriever failure lands on a documented
//! fallback — a generation request only fails outright when cancelled.

use crate::llm::{ChatMessage, ChatModel};
use crate::models::{CaseDefinition, Report, ReportMetadata, ReportType};
use crate::pipeline::citation::{build_citations, scrub_unknown_tokens};
use crate::pipeline::condenser::{condense, CondenserBudget};
use crate::pipeline::prompt::{build_synthesis_prompt, SYNTHESIS_SYSTEM_PROMPT};
use crate::pipeline::queries::generate_queries;
use crate::pipeline::retrieval::{dedupe_passages, Retriever};
use crate::rubric::Rubric;
use crate::scoring;
use crate::session::Transcript;

use super::render::{render_detailed_fallback, render_error_section, render_feedback};
use super::{CancelFlag, ReportError};

/// Passages requested per retrieval query.
const RETRIEVAL_TOP_K: usize = 2;

pub struct ReportComposer<'a, G: ChatModel> {
    chat: &'a G,
    rubric: &'a Rubric,
    retriever: Option<&'a dyn Retriever>,
    budget: CondenserBudget,
    cancel: CancelFlag,
}

impl<'a, G: ChatModel> ReportComposer<'a, G> {
    pub fn new(chat: &'a G, rubric: &'a Rubric) -> Self {
        Self {
            chat,
            rubric,
            retriever: None,
            budget: CondenserBudget::default(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_retriever(mut self, retriever: &'a dyn Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_budget(mut self, budget: CondenserBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Handle the caller can use to abort between phases.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Fast path: rubric score + coverage, no retrieval, no LLM.
    ///
    /// A scoring failure degrades to a coverage-only summary — scoring
    /// errors never mask coverage.
    pub fn generate_feedback_report(
        &self,
        transcript: &Transcript,
        case: &CaseDefinition,
    ) -> Result<Report, ReportError> {
        self.ensure_active()?;

        let score = match scoring::score(transcript, self.rubric) {
            Ok(score) => Some(score),
            Err(e) => {
                tracing::warn!(error = %e, "rubric scoring failed — coverage-only feedback");
                None
            }
        };

        let content = render_feedback(score.as_ref(), transcript, case);
        Ok(self.assemble(
            ReportType::Feedback,
            content,
            transcript,
            case,
            vec![],
            vec![],
            false,
            None,
        ))
    }

    /// Full path: preliminary feedback, retrieval, condensation, and one
    /// synthesis call. Unanticipated failures surface as an error section
    /// inside the report; only cancellation is returned as an error.
    pub fn generate_detailed_report(
        &self,
        transcript: &Transcript,
        case: &CaseDefinition,
    ) -> Result<Report, ReportError> {
        match self.detailed_inner(transcript, case) {
            Ok(report) => Ok(report),
            Err(ReportError::Cancelled) => Err(ReportError::Cancelled),
            Err(e) => {
                tracing::error!(error = %e, "detailed report failed — emitting error report");
                let mut content = render_feedback(None, transcript, case);
                content.push_str(&render_error_section(&e.to_string()));
                Ok(self.assemble(
                    ReportType::Detailed,
                    content,
                    transcript,
                    case,
                    vec![],
                    vec![],
                    false,
                    None,
                ))
            }
        }
    }

    fn detailed_inner(
        &self,
        transcript: &Transcript,
        case: &CaseDefinition,
    ) -> Result<Report, ReportError> {
        // Phase 1: preliminary feedback (also the synthesis fallback body).
        let preliminary = self.generate_feedback_report(transcript, case)?;

        // Phase 2: retrieval queries from the preliminary text.
        self.ensure_active()?;
        let queries = generate_queries(&preliminary.content);

        // Phase 3: retrieval. An unavailable retriever drops the evidence
        // block; the report still goes out.
        self.ensure_active()?;
        let mut results = Vec::new();
        if let Some(retriever) = self.retriever {
            for query in &queries {
                match retriever.search(query, RETRIEVAL_TOP_K) {
                    Ok(passages) => {
                        results.extend(passages.into_iter().map(|p| (query.clone(), p)));
                    }
                    Err(e) => {
                        tracing::warn!(query = %query, error = %e, "retrieval failed — skipping query");
                    }
                }
            }
        }
        let citations = build_citations(dedupe_passages(results));

        // Phase 4: condense to the context budget.
        self.ensure_active()?;
        let conversation = conversation_text(transcript);
        let condensed = condense(self.chat, &conversation, &citations, &self.budget);

        // Phase 5: one synthesis call; failure falls back to preliminary +
        // raw condensed evidence.
        self.ensure_active()?;
        let synthesis = self.chat.chat(&[
            ChatMessage::system(SYNTHESIS_SYSTEM_PROMPT),
            ChatMessage::user(build_synthesis_prompt(transcript, case, &condensed.text)),
        ]);

        let (content, llm_used) = match synthesis {
            Ok(narrative) => (scrub_unknown_tokens(&narrative, citations.len()), true),
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed — preliminary + evidence fallback");
                (
                    render_detailed_fallback(&preliminary.content, &condensed.text),
                    false,
                )
            }
        };

        let strategy = (!citations.is_empty()).then(|| condensed.strategy.as_str().to_string());
        Ok(self.assemble(
            ReportType::Detailed,
            content,
            transcript,
            case,
            citations,
            queries,
            llm_used,
            strategy,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        report_type: ReportType,
        content: String,
        transcript: &Transcript,
        case: &CaseDefinition,
        citations: Vec<crate::models::Citation>,
        rag_queries: Vec<String>,
        llm_used: bool,
        condense_strategy: Option<String>,
    ) -> Report {
        Report {
            report_type,
            content,
            case_id: case.case_id.clone(),
            coverage: transcript.coverage().coverage_pct,
            citations,
            rag_queries,
            metadata: ReportMetadata {
                generated_at: chrono::Local::now().to_rfc3339(),
                conversation_length: transcript.len(),
                llm_used,
                condense_strategy,
            },
        }
    }

    fn ensure_active(&self) -> Result<(), ReportError> {
        if self.cancel.is_cancelled() {
            return Err(ReportError::Cancelled);
        }
        Ok(())
    }
}

fn conversation_text(transcript: &Transcript) -> String {
    transcript
        .turns()
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}
