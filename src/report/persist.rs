//! Report persistence: Markdown with YAML front-matter.
//!
//! The front-matter carries the machine-readable envelope (case, type,
//! coverage, and for detailed reports the ordered citations); the body is
//! the rendered document. Consumers re-parse the front-matter to index
//! reports without touching the narrative.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::{Citation, Report};

use super::ReportError;

#[derive(Serialize)]
struct FrontMatter<'a> {
    case_id: &'a str,
    report_type: &'a str,
    generated_at: &'a str,
    coverage: u8,
    message_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    citations: Option<&'a [Citation]>,
}

/// Write a report into `dir`, returning the file path.
///
/// Filename: `{case_id}-{report_type}-{timestamp}.md`. The directory is
/// created if missing.
pub fn write_report(report: &Report, dir: &Path) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!(
        "{}-{}-{timestamp}.md",
        sanitize_component(&report.case_id),
        report.report_type.as_str()
    );
    let path = dir.join(filename);

    let document = render_document(report);
    std::fs::write(&path, document).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(path = %path.display(), "report written");
    Ok(path)
}

fn render_document(report: &Report) -> String {
    let front = FrontMatter {
        case_id: &report.case_id,
        report_type: report.report_type.as_str(),
        generated_at: &report.metadata.generated_at,
        coverage: report.coverage,
        message_count: report.metadata.conversation_length,
        citations: (!report.citations.is_empty()).then_some(report.citations.as_slice()),
    };

    let yaml = serde_yaml::to_string(&front).unwrap_or_default();
    format!("---\n{yaml}---\n\n{}", report.content)
}

/// Keep filenames portable: ids may come from user-authored case files.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportMetadata, ReportType};

    fn report(report_type: ReportType, citations: Vec<Citation>) -> Report {
        Report {
            report_type,
            content: "# 回饋報告\n內容".into(),
            case_id: "chest-pain-01".into(),
            coverage: 45,
            citations,
            rag_queries: vec![],
            metadata: ReportMetadata {
                generated_at: "2026-08-07T10:00:00+08:00".into(),
                conversation_length: 12,
                llm_used: true,
                condense_strategy: None,
            },
        }
    }

    fn citation(id: usize) -> Citation {
        Citation {
            id,
            query: "急性胸痛 評估".into(),
            source: "acs.md".into(),
            content: "心電圖應於十分鐘內完成".into(),
            score: Some(0.8),
        }
    }

    #[test]
    fn feedback_report_has_front_matter_without_citations() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&report(ReportType::Feedback, vec![]), dir.path()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("---\n"));
        assert!(written.contains("case_id: chest-pain-01"));
        assert!(written.contains("report_type: feedback"));
        assert!(written.contains("coverage: 45"));
        assert!(written.contains("message_count: 12"));
        assert!(!written.contains("citations"));
        assert!(written.ends_with("內容"));
    }

    #[test]
    fn detailed_report_lists_ordered_citations() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(
            &report(ReportType::Detailed, vec![citation(1), citation(2)]),
            dir.path(),
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("citations:"));
        let first = written.find("id: 1").unwrap();
        let second = written.find("id: 2").unwrap();
        assert!(first < second);
        assert!(written.contains("source: acs.md"));
        assert!(written.contains("score: 0.8"));
    }

    #[test]
    fn filename_carries_case_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&report(ReportType::Detailed, vec![]), dir.path()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("chest-pain-01-detailed-"));
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn hostile_case_id_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = report(ReportType::Feedback, vec![]);
        r.case_id = "../../etc/passwd".into();

        let path = write_report(&r, dir.path()).unwrap();
        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.contains(".."));
        assert!(!name.contains('/'));
    }

    #[test]
    fn directory_created_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("2026");
        let path = write_report(&report(ReportType::Feedback, vec![]), &nested).unwrap();
        assert!(path.exists());
    }
}
