//! Result and transcript files.
//!
//! Each paper `<stem>.html` produces `<results_dir>/<stem>.json` and, on request,
//! `<results_dir>/<stem>.md`.

use crate::error::{CliError, Result};
use serde::Serialize;
use statsift_document::Document;
use statsift_domain::Finding;
use statsift_extractor::{ExtractionReport, LoopOutcome, Transcript};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a persisted result file.
#[derive(Debug, Serialize)]
pub struct ResultFile<'a> {
    /// Paper title
    pub title: &'a str,
    /// Bare DOI, e.g. `10.1145/3544548.3581111`
    pub doi: Option<&'a str>,
    /// Resolvable DOI link
    pub link: Option<String>,
    /// How the extraction ended
    pub outcome: LoopOutcome,
    /// Reported findings
    pub tests: &'a [Finding],
}

impl<'a> ResultFile<'a> {
    /// Assemble the result for a document and its report.
    pub fn new(document: &'a Document, report: &'a ExtractionReport) -> Self {
        let doi = document.doi();
        Self {
            title: document.title().unwrap_or_default(),
            doi,
            link: doi.map(|doi| format!("https://doi.org/{}", doi)),
            outcome: report.outcome,
            tests: &report.findings,
        }
    }
}

/// Output locations for one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPaths {
    /// JSON result file
    pub result: PathBuf,
    /// Markdown transcript file
    pub transcript: PathBuf,
}

impl ResultPaths {
    /// Derive the output paths for an input file.
    pub fn for_input(results_dir: &Path, input: &Path) -> Result<Self> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                CliError::InvalidInput(format!("Cannot derive a result name from {}", input.display()))
            })?;

        Ok(Self {
            result: results_dir.join(format!("{}.json", stem)),
            transcript: results_dir.join(format!("{}.md", stem)),
        })
    }

    /// Whether a result already exists for this paper.
    pub fn is_done(&self) -> bool {
        self.result.exists()
    }
}

/// Write the JSON result (and optionally the transcript) for one paper.
pub fn write_results(
    paths: &ResultPaths,
    document: &Document,
    report: &ExtractionReport,
    transcript: bool,
) -> Result<()> {
    if let Some(parent) = paths.result.parent() {
        fs::create_dir_all(parent)?;
    }

    let result = ResultFile::new(document, report);
    fs::write(&paths.result, serde_json::to_string_pretty(&result)?)?;

    if transcript {
        fs::write(&paths.transcript, Transcript::to_markdown(&report.messages))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use statsift_domain::Message;
    use tempfile::TempDir;

    const PAPER: &str = r#"<html><head><title>Typing on Glass</title></head><body>
        <div class="abstract"><p>We compare keyboards.</p></div>
        <a href="https://doi.org/10.1145/3544548.3581111">doi</a></body></html>"#;

    fn report() -> ExtractionReport {
        ExtractionReport {
            findings: vec![Finding {
                test_name: "Friedman test".into(),
                ..Finding::default()
            }],
            outcome: LoopOutcome::RecursionBudgetExceeded { limit: 3 },
            round_trips: 3,
            messages: vec![Message::system("sys"), Message::human("task")],
        }
    }

    #[test]
    fn test_paths_from_stem() {
        let paths = ResultPaths::for_input(Path::new("out"), Path::new("papers/3544548.html")).unwrap();
        assert_eq!(paths.result, Path::new("out/3544548.json"));
        assert_eq!(paths.transcript, Path::new("out/3544548.md"));
    }

    #[test]
    fn test_paths_reject_nameless_input() {
        assert!(ResultPaths::for_input(Path::new("out"), Path::new("/")).is_err());
    }

    #[test]
    fn test_write_result_file() {
        let dir = TempDir::new().unwrap();
        let paths = ResultPaths::for_input(&dir.path().join("results"), Path::new("p.html")).unwrap();
        let document = Document::from_html(PAPER).unwrap();
        let report = report();

        assert!(!paths.is_done());
        write_results(&paths, &document, &report, false).unwrap();
        assert!(paths.is_done());
        assert!(!paths.transcript.exists());

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.result).unwrap()).unwrap();
        assert_eq!(written["title"], "Typing on Glass");
        assert_eq!(written["doi"], "10.1145/3544548.3581111");
        assert_eq!(written["link"], "https://doi.org/10.1145/3544548.3581111");
        assert_eq!(written["outcome"]["kind"], "recursion_budget_exceeded");
        assert_eq!(written["outcome"]["limit"], 3);
        assert_eq!(written["tests"][0]["test_name"], "Friedman test");
        assert_eq!(written["tests"][0]["N"], "UNKNOWN");
    }

    #[test]
    fn test_write_transcript() {
        let dir = TempDir::new().unwrap();
        let paths = ResultPaths::for_input(dir.path(), Path::new("p.html")).unwrap();
        let document = Document::from_html(PAPER).unwrap();

        write_results(&paths, &document, &report(), true).unwrap();

        let md = fs::read_to_string(&paths.transcript).unwrap();
        assert!(md.starts_with("#### System\nsys"));
        assert!(md.contains("#### Human\ntask"));
    }
}
