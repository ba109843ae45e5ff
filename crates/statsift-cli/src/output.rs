//! Output formatting for the CLI.

use crate::commands::extract::{PaperStatus, PaperSummary};
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use colored::*;
use statsift_document::DocumentIndex;
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a document's section and table index.
    pub fn format_index(&self, index: &DocumentIndex) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(index)?),
            OutputFormat::Table => Ok(self.format_index_table(index)),
            OutputFormat::Quiet => {
                let lines: Vec<String> = index
                    .sections
                    .iter()
                    .map(|s| s.address.clone())
                    .filter(|a| !a.is_empty())
                    .chain(index.tables.iter().map(|t| format!("Table {}", t.address)))
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    fn format_index_table(&self, index: &DocumentIndex) -> String {
        let sections = if index.sections.is_empty() {
            self.colorize("No sections found.", "yellow")
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Section", "Title"]);
            for section in &index.sections {
                builder.push_record([section.address.as_str(), section.title.as_str()]);
            }
            styled(builder)
        };

        let tables = if index.tables.is_empty() {
            self.colorize("No tables found.", "yellow")
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Table", "Caption"]);
            for table in &index.tables {
                builder.push_record([table.address.as_str(), table.caption.as_str()]);
            }
            styled(builder)
        };

        format!("{}\n{}", sections, tables)
    }

    /// Format the text returned by a read capability.
    pub fn format_read(&self, capability: &str, content: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "capability": capability,
                "content": content,
            }))?),
            OutputFormat::Table | OutputFormat::Quiet => Ok(content.to_string()),
        }
    }

    /// Format the per-paper summary of an extract run.
    pub fn format_batch(&self, summaries: &[PaperSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(summaries)?),
            OutputFormat::Table => Ok(self.format_batch_table(summaries)),
            OutputFormat::Quiet => {
                let paths: Vec<String> = summaries
                    .iter()
                    .filter_map(|s| s.result.as_ref())
                    .map(|p| p.display().to_string())
                    .collect();
                Ok(paths.join("\n"))
            }
        }
    }

    fn format_batch_table(&self, summaries: &[PaperSummary]) -> String {
        if summaries.is_empty() {
            return self.colorize("No papers processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Paper", "Status", "Tests", "Round trips", "Detail"]);

        for summary in summaries {
            let detail = match (&summary.error, &summary.outcome, &summary.result) {
                (Some(error), _, _) => error.clone(),
                (None, Some(outcome), _) => outcome.to_string(),
                (None, None, Some(result)) => format!("{} exists", result.display()),
                (None, None, None) => String::new(),
            };
            builder.push_record([
                summary.file.display().to_string(),
                self.status_label(summary.status),
                summary.findings.to_string(),
                summary.round_trips.to_string(),
                detail,
            ]);
        }

        let done = summaries
            .iter()
            .filter(|s| matches!(s.status, PaperStatus::Done | PaperStatus::Partial))
            .count();
        let tests: usize = summaries.iter().map(|s| s.findings).sum();

        format!(
            "{}\n{}",
            styled(builder),
            self.success(&format!("Extracted {} test(s) from {} paper(s)", tests, done))
        )
    }

    /// Format the effective configuration.
    pub fn format_config(&self, config: &Config, path: &Path) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "path": path,
                "config": config,
            }))?),
            OutputFormat::Table => Ok(format!(
                "{}\n\n{}",
                self.info(&format!("Configuration file: {}", path.display())),
                config.to_toml()?
            )),
            OutputFormat::Quiet => config.to_toml(),
        }
    }

    fn status_label(&self, status: PaperStatus) -> String {
        match status {
            PaperStatus::Done => self.colorize("done", "green"),
            PaperStatus::Partial => self.colorize("partial", "yellow"),
            PaperStatus::Skipped => self.colorize("skipped", "blue"),
            PaperStatus::Failed => self.colorize("failed", "red"),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}
