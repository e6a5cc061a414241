//! Map-Reduce evidence condensation.
//!
//! The synthesis model may be a small on-device one with a tight context
//! window; retrieved guideline material can be arbitrarily large. This
//! module guarantees the evidence block handed to synthesis fits the
//! configured budget, degrading through deterministic fallbacks when the
//! LLM is unavailable — it never errors.

use serde::{Deserialize, Serialize};

use crate::llm::{ChatMessage, ChatModel};
use crate::models::Citation;
use crate::text::{char_len, truncate_chars};

use super::prompt::{build_map_prompt, build_reduce_prompt, MAP_SYSTEM_PROMPT, REDUCE_SYSTEM_PROMPT};

/// Character budgets driving the condensation strategy. All limits are in
/// characters, not bytes — the working language is multi-byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondenserBudget {
    /// Hard ceiling for the returned evidence block.
    pub max_context_chars: usize,
    /// Citations per map batch.
    pub batch_size: usize,
    /// Target length for each batch summary.
    pub per_doc_summary_chars: usize,
    /// Target length for the reduce step.
    pub max_final_chars: usize,
}

impl Default for CondenserBudget {
    fn default() -> Self {
        Self {
            max_context_chars: 4000,
            batch_size: 4,
            per_doc_summary_chars: 300,
            max_final_chars: 1500,
        }
    }
}

/// How the evidence block was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondenseStrategy {
    /// Everything fit — evidence joined verbatim, no LLM call.
    Direct,
    /// Batched map summaries, optionally reduced.
    MapReduce,
}

impl CondenseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::MapReduce => "map_reduce",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CondensedEvidence {
    pub text: String,
    pub strategy: CondenseStrategy,
    /// Whether at least one LLM call succeeded during condensation.
    pub llm_used: bool,
}

/// Condense retrieved citations to a block that fits the budget.
///
/// Citation order is preserved across batches; the returned text is always
/// at most `max_context_chars` characters.
pub fn condense<G: ChatModel>(
    chat: &G,
    conversation: &str,
    citations: &[Citation],
    budget: &CondenserBudget,
) -> CondensedEvidence {
    if citations.is_empty() {
        return CondensedEvidence {
            text: String::new(),
            strategy: CondenseStrategy::Direct,
            llm_used: false,
        };
    }

    // Sizing: when conversation plus raw evidence fits, skip the LLM.
    let total = char_len(conversation)
        + citations.iter().map(|c| char_len(&c.content)).sum::<usize>();
    if total <= budget.max_context_chars {
        return CondensedEvidence {
            text: enforce_budget(join_evidence(citations), budget.max_context_chars),
            strategy: CondenseStrategy::Direct,
            llm_used: false,
        };
    }

    tracing::info!(
        total_chars = total,
        budget = budget.max_context_chars,
        "evidence over budget — map-reduce condensation"
    );

    // Map: summarize contiguous batches against the conversation head.
    let head = truncate_chars(conversation, budget.max_context_chars / 2);
    let mut llm_used = false;
    let mut sections = Vec::new();

    for batch in citations.chunks(budget.batch_size.max(1)) {
        let heading = batch_heading(batch);
        let summary = match chat.chat(&[
            ChatMessage::system(MAP_SYSTEM_PROMPT),
            ChatMessage::user(build_map_prompt(&head, batch, budget.per_doc_summary_chars)),
        ]) {
            Ok(text) => {
                llm_used = true;
                truncate_chars(
                    text.trim(),
                    budget.per_doc_summary_chars * batch.len(),
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "map batch failed — truncation fallback");
                fallback_summary(batch, budget.per_doc_summary_chars)
            }
        };
        sections.push(format!("### {heading}\n{summary}"));
    }

    // Reduce: join, and condense once more if still over budget.
    let mut joined = sections.join("\n\n");
    if char_len(&joined) > budget.max_context_chars {
        joined = match chat.chat(&[
            ChatMessage::system(REDUCE_SYSTEM_PROMPT),
            ChatMessage::user(build_reduce_prompt(&joined, budget.max_final_chars)),
        ]) {
            Ok(text) => {
                llm_used = true;
                text.trim().to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "reduce failed — truncating evidence");
                format!("{}…", truncate_chars(&joined, budget.max_final_chars))
            }
        };
    }

    CondensedEvidence {
        text: enforce_budget(joined, budget.max_context_chars),
        strategy: CondenseStrategy::MapReduce,
        llm_used,
    }
}

/// Raw evidence block for the direct strategy.
fn join_evidence(citations: &[Citation]) -> String {
    citations
        .iter()
        .map(|c| format!("[citation {}]（{}）\n{}", c.id, c.source, c.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Deterministic per-batch fallback: the head of each passage.
fn fallback_summary(batch: &[Citation], per_doc_chars: usize) -> String {
    batch
        .iter()
        .map(|c| {
            format!(
                "[citation {}] {}",
                c.id,
                truncate_chars(&c.content, per_doc_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn batch_heading(batch: &[Citation]) -> String {
    let first = batch.first().map(|c| c.id).unwrap_or(0);
    let last = batch.last().map(|c| c.id).unwrap_or(0);
    if first == last {
        format!("證據 {first}")
    } else {
        format!("證據 {first}–{last}")
    }
}

/// Final guard: the contract is a hard ceiling, whatever the LLM returned.
fn enforce_budget(text: String, max_chars: usize) -> String {
    if char_len(&text) <= max_chars {
        return text;
    }
    format!("{}…", truncate_chars(&text, max_chars.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatModel;

    fn citation(id: usize, content: String) -> Citation {
        Citation {
            id,
            query: "q".into(),
            source: format!("doc{id}.md"),
            content,
            score: None,
        }
    }

    fn budget(max: usize, batch: usize) -> CondenserBudget {
        CondenserBudget {
            max_context_chars: max,
            batch_size: batch,
            per_doc_summary_chars: 100,
            max_final_chars: max / 2,
        }
    }

    #[test]
    fn under_budget_uses_direct_strategy() {
        // S6: 1500 chars of evidence + 300-char conversation under 2000.
        let chat = MockChatModel::always("unused");
        let citations = vec![
            citation(1, "甲".repeat(700)),
            citation(2, "乙".repeat(800)),
        ];
        let conversation = "話".repeat(300);

        let result = condense(&chat, &conversation, &citations, &budget(2000, 2));
        assert_eq!(result.strategy, CondenseStrategy::Direct);
        assert!(!result.llm_used);
        assert_eq!(chat.calls(), 0);
        assert!(result.text.contains("[citation 1]"));
        assert!(result.text.contains("[citation 2]"));
    }

    #[test]
    fn over_budget_maps_in_citation_order() {
        // S7: 5 citations / batch_size 2 → 3 map batches, order preserved.
        let chat = MockChatModel::scripted(vec![
            "摘要一 [citation 1][citation 2]",
            "摘要二 [citation 3][citation 4]",
            "摘要三 [citation 5]",
        ]);
        let citations: Vec<Citation> = (1..=5)
            .map(|id| citation(id, "內".repeat(2000)))
            .collect();

        let result = condense(&chat, "對話", &citations, &budget(2000, 2));
        assert_eq!(result.strategy, CondenseStrategy::MapReduce);
        assert_eq!(chat.calls(), 3);
        assert!(result.llm_used);
        assert!(char_len(&result.text) <= 2000);

        let first = result.text.find("證據 1–2").unwrap();
        let second = result.text.find("證據 3–4").unwrap();
        let third = result.text.find("證據 5").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn map_failure_falls_back_to_truncation() {
        let chat = MockChatModel::failing();
        let citations: Vec<Citation> = (1..=4)
            .map(|id| citation(id, format!("第{id}段指引內容") + &"長".repeat(3000)))
            .collect();

        let result = condense(&chat, "對話", &citations, &budget(2000, 2));
        // Every batch fell back to passage heads — still a usable block.
        assert!(!result.llm_used);
        assert!(char_len(&result.text) <= 2000);
        assert!(result.text.contains("[citation 1]"));
    }

    #[test]
    fn budget_holds_for_any_llm_output() {
        // A misbehaving model that answers far over target.
        let chat = MockChatModel::always(&"超".repeat(5000));
        let citations: Vec<Citation> =
            (1..=6).map(|id| citation(id, "內".repeat(1000))).collect();

        let result = condense(&chat, "對話", &citations, &budget(1000, 2));
        assert!(char_len(&result.text) <= 1000);
    }

    #[test]
    fn reduce_invoked_when_summaries_still_too_long() {
        // Map summaries each near the cap force a reduce call.
        let long_summary = "長".repeat(900);
        let chat = MockChatModel::scripted(vec![
            long_summary.as_str(),
            long_summary.as_str(),
            long_summary.as_str(),
            "精簡後 [citation 1]…[citation 6]",
        ]);
        let citations: Vec<Citation> =
            (1..=6).map(|id| citation(id, "內".repeat(1000))).collect();

        let mut b = budget(2000, 2);
        b.per_doc_summary_chars = 1000;
        let result = condense(&chat, "對話", &citations, &b);
        assert_eq!(chat.calls(), 4);
        assert!(result.text.contains("精簡後"));
        assert!(char_len(&result.text) <= 2000);
    }

    #[test]
    fn no_citations_yields_empty_block() {
        let chat = MockChatModel::always("unused");
        let result = condense(&chat, "對話", &[], &CondenserBudget::default());
        assert!(result.text.is_empty());
        assert_eq!(chat.calls(), 0);
    }

    #[test]
    fn total_llm_outage_never_errors() {
        let chat = MockChatModel::failing();
        for count in [1usize, 3, 7] {
            let citations: Vec<Citation> = (1..=count)
                .map(|id| citation(id, "內".repeat(1500)))
                .collect();
            let result = condense(&chat, "對話", &citations, &budget(1500, 3));
            assert!(char_len(&result.text) <= 1500);
            assert!(!result.text.is_empty());
        }
    }
}
