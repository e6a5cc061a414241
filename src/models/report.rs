use serde::{Deserialize, Serialize};

use super::enums::ReportType;

/// A retrieved passage attached to a detailed report.
///
/// Ids are 1-based and dense within a single report; narrative text refers
/// to them with literal `[citation N]` tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub id: usize,
    /// The query that retrieved this passage.
    pub query: String,
    pub source: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// A rendered performance report. Value object: produced once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub report_type: ReportType,
    pub content: String,
    pub case_id: String,
    /// Coverage percentage at generation time, in [0, 100].
    pub coverage: u8,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub rag_queries: Vec<String>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub conversation_length: usize,
    pub llm_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condense_strategy: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_omits_missing_score() {
        let citation = Citation {
            id: 1,
            query: "ECG priority in chest pain".into(),
            source: "acs-guideline.md".into(),
            content: "12-lead ECG within 10 minutes of arrival".into(),
            score: None,
        };
        let json = serde_json::to_string(&citation).unwrap();
        assert!(!json.contains("score"));
    }

    #[test]
    fn report_round_trip() {
        let report = Report {
            report_type: ReportType::Detailed,
            content: "## 評估\n依據 [citation 1]...".into(),
            case_id: "chest-pain-01".into(),
            coverage: 45,
            citations: vec![Citation {
                id: 1,
                query: "q".into(),
                source: "s".into(),
                content: "c".into(),
                score: Some(0.8),
            }],
            rag_queries: vec!["q".into()],
            metadata: ReportMetadata {
                generated_at: "2026-08-07T10:00:00+08:00".into(),
                conversation_length: 12,
                llm_used: true,
                condense_strategy: Some("map_reduce".into()),
            },
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back.report_type, ReportType::Detailed);
        assert_eq!(back.citations.len(), 1);
        assert_eq!(back.coverage, 45);
    }
}
