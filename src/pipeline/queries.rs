//! Retrieval query composition.
//!
//! Queries are derived from the preliminary feedback text by topical
//! keyword tables rather than by asking the LLM — retrieval stays targeted
//! even when no model is reachable. At most three canonical queries are
//! produced; a fixed two-query fallback covers feedback that matches no
//! topic.

/// Maximum canonical queries per detailed report.
const MAX_QUERIES: usize = 3;

/// Topic table: trigger keywords (matched against lower-cased feedback
/// text) → canonical retrieval query.
const TOPIC_QUERIES: &[(&[&str], &str)] = &[
    (
        &["心電圖", "ecg", "ekg", "導程"],
        "急性胸痛 心電圖 時效 優先順序",
    ),
    (
        &["opqrst", "疼痛病史", "疼痛性質"],
        "OPQRST 疼痛病史 詢問技巧",
    ),
    (
        &["紅旗", "危險徵象", "red flag", "冒汗", "輻射痛"],
        "胸痛 危險徵象 立即處置",
    ),
    (
        &["生命徵象", "血壓", "vital"],
        "急診 初步評估 生命徵象",
    ),
    (
        &["用藥", "藥物", "阿斯匹靈", "aspirin"],
        "急性冠心症 初期 藥物處置",
    ),
    (
        &["自我介紹", "溝通", "同理"],
        "臨床問診 溝通 同理心",
    ),
];

/// Fixed queries used when the feedback matches no topic.
const FALLBACK_QUERIES: &[&str] = &["急性胸痛 評估 臨床指引", "OSCE 病史詢問 標準流程"];

/// Derive up to three retrieval queries from preliminary feedback text.
pub fn generate_queries(feedback_text: &str) -> Vec<String> {
    let lower = feedback_text.to_lowercase();

    let mut queries: Vec<String> = TOPIC_QUERIES
        .iter()
        .filter(|(triggers, _)| triggers.iter().any(|t| lower.contains(t)))
        .map(|(_, query)| query.to_string())
        .take(MAX_QUERIES)
        .collect();

    if queries.is_empty() {
        queries = FALLBACK_QUERIES.iter().map(|q| q.to_string()).collect();
    }

    tracing::debug!(count = queries.len(), "retrieval queries composed");
    queries
}
