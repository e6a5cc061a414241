//! Prompt builders for the condensation and synthesis LLM calls.

use crate::models::{CaseDefinition, Citation};
use crate::session::Transcript;

pub const MAP_SYSTEM_PROMPT: &str = "你是臨床教學助理。閱讀對話摘錄與提供的指引段落，\
只保留與這段對話直接相關的重點。不要加入段落以外的知識，不要評論學生表現。";

pub const REDUCE_SYSTEM_PROMPT: &str = "你是臨床教學助理。把多段證據摘要合併成一段更精簡的版本，\
保留每個 [citation N] 標記與其對應重點，不新增內容。";

pub const SYNTHESIS_SYSTEM_PROMPT: &str = r#"你是 OSCE 教學評估者，根據完整對話、評核清單與證據段落撰寫詳細回饋報告。

輸出規則 — 必須全部遵守：
1. 使用繁體中文。
2. 依序輸出四個小節：## 整體表現、## 問診技巧、## 臨床處置、## 改進建議。
3. 引用證據段落時，必須使用字面標記 [citation N]（N 為證據編號）；不得引用不存在的編號。
4. 回饋針對「學生」的行為，不評論病人。
5. 不要輸出署名、日期或任何結尾欄位。"#;

/// Map phase: one batch of passages against a truncated conversation head.
pub fn build_map_prompt(
    conversation_head: &str,
    batch: &[Citation],
    summary_chars: usize,
) -> String {
    let mut prompt = String::new();
    prompt.push_str("<對話摘錄>\n");
    prompt.push_str(conversation_head);
    prompt.push_str("\n</對話摘錄>\n\n<指引段落>\n");
    for citation in batch {
        prompt.push_str(&format!(
            "[citation {}]（{}）\n{}\n\n",
            citation.id, citation.source, citation.content
        ));
    }
    prompt.push_str("</指引段落>\n\n");
    prompt.push_str(&format!(
        "請以不超過 {summary_chars} 字摘要上述段落中與對話相關的重點，\
並保留各段的 [citation N] 標記。"
    ));
    prompt
}

/// Reduce phase: joined batch summaries still over budget.
pub fn build_reduce_prompt(joined_summaries: &str, target_chars: usize) -> String {
    format!(
        "以下是多段證據摘要：\n\n{joined_summaries}\n\n\
請合併為一段不超過 {target_chars} 字的版本，保留所有 [citation N] 標記。"
    )
}

/// Final synthesis: transcript + checklist recap + critical actions +
/// condensed evidence.
pub fn build_synthesis_prompt(
    transcript: &Transcript,
    case: &CaseDefinition,
    evidence: &str,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("<對話全文>\n");
    for turn in transcript.turns() {
        prompt.push_str(&format!("{}: {}\n", turn.role.as_str(), turn.content));
    }
    prompt.push_str("</對話全文>\n\n<評核清單>\n");
    for item in case.checklist() {
        let status = if transcript.coverage().covered_ids.contains(&item.id) {
            "已涵蓋"
        } else if transcript.coverage().partial_ids.contains(&item.id) {
            "部分涵蓋"
        } else {
            "未涵蓋"
        };
        prompt.push_str(&format!("- {}（{}）\n", item.point, status));
    }
    prompt.push_str("</評核清單>\n\n<關鍵處置>\n");
    for action in case.critical_actions() {
        prompt.push_str(&format!("- {}\n", action.description));
    }
    prompt.push_str("</關鍵處置>\n");

    if !evidence.is_empty() {
        prompt.push_str("\n<證據段落>\n");
        prompt.push_str(evidence);
        prompt.push_str("\n</證據段落>\n");
    }

    prompt.push_str("\n請依系統指示的小節結構撰寫詳細回饋報告。");
    prompt
}
