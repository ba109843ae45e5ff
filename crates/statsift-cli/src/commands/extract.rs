//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::persist::{write_results, ResultPaths};
use anyhow::Context;
use serde::Serialize;
use statsift_document::Document;
use statsift_domain::ReasoningService;
use statsift_extractor::{ExtractionReport, Extractor, ExtractorConfig, LoopOutcome};
use statsift_llm::{OpenAiChatService, Sleeper};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// How one paper fared in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperStatus {
    /// Finished normally
    Done,
    /// Round-trip budget ran out; findings are partial
    Partial,
    /// A result file already existed
    Skipped,
    /// Loading, extraction or writing failed
    Failed,
}

/// Summary line for one paper.
#[derive(Debug, Clone, Serialize)]
pub struct PaperSummary {
    /// Input file
    pub file: PathBuf,
    /// Status
    pub status: PaperStatus,
    /// Number of findings written
    pub findings: usize,
    /// Model turns taken
    pub round_trips: usize,
    /// Loop outcome, when the loop ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<LoopOutcome>,
    /// Result file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PathBuf>,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaperSummary {
    fn finished(file: &Path, paths: &ResultPaths, report: &ExtractionReport) -> Self {
        let status = if report.outcome.is_partial() {
            PaperStatus::Partial
        } else {
            PaperStatus::Done
        };
        Self {
            file: file.to_path_buf(),
            status,
            findings: report.finding_count(),
            round_trips: report.round_trips,
            outcome: Some(report.outcome),
            result: Some(paths.result.clone()),
            error: None,
        }
    }

    fn skipped(file: &Path, paths: &ResultPaths) -> Self {
        Self {
            file: file.to_path_buf(),
            status: PaperStatus::Skipped,
            findings: 0,
            round_trips: 0,
            outcome: None,
            result: Some(paths.result.clone()),
            error: None,
        }
    }

    fn failed(file: &Path, error: String) -> Self {
        Self {
            file: file.to_path_buf(),
            status: PaperStatus::Failed,
            findings: 0,
            round_trips: 0,
            outcome: None,
            result: None,
            error: Some(error),
        }
    }
}

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if args.jobs == 0 {
        return Err(CliError::InvalidInput("--jobs must be at least 1".to_string()));
    }

    let results_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| config.output.results_dir.clone());

    let mut summaries = Vec::new();
    let mut pending = Vec::new();
    for file in &args.files {
        let paths = ResultPaths::for_input(&results_dir, file)?;
        if paths.is_done() && !args.force {
            info!("Skipping {}: {} exists", file.display(), paths.result.display());
            summaries.push(PaperSummary::skipped(file, &paths));
        } else {
            pending.push((file.clone(), paths));
        }
    }

    if !pending.is_empty() {
        let extractor_config = if args.quick {
            ExtractorConfig::quick()
        } else {
            config.extractor.clone()
        };
        let model = args.model.unwrap_or_else(|| config.service.model.clone());
        let service = OpenAiChatService::new(&config.service.endpoint, model)
            .with_api_key(config.api_key()?)
            .with_temperature(config.service.temperature);
        let extractor = Arc::new(Extractor::new(Arc::new(service), extractor_config)?);

        info!(
            papers = pending.len(),
            jobs = args.jobs,
            model = extractor.model_name(),
            "Starting batch"
        );
        summaries.extend(run_batch(extractor, pending, args.jobs, args.transcript).await);
    }

    println!("{}", formatter.format_batch(&summaries)?);

    let failed = summaries
        .iter()
        .filter(|s| s.status == PaperStatus::Failed)
        .count();
    if failed > 0 {
        return Err(CliError::BatchFailed {
            failed,
            total: summaries.len(),
        });
    }

    Ok(())
}

/// Process papers concurrently, at most `jobs` at a time.
///
/// Every paper gets its own document, loop and accumulator; only the extractor
/// (and through it the service) is shared. Summaries come back in input order.
pub async fn run_batch<S, Z>(
    extractor: Arc<Extractor<S, Z>>,
    papers: Vec<(PathBuf, ResultPaths)>,
    jobs: usize,
    transcript: bool,
) -> Vec<PaperSummary>
where
    S: ReasoningService + ?Sized + 'static,
    Z: Sleeper + Clone + 'static,
{
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();
    let files: Vec<PathBuf> = papers.iter().map(|(file, _)| file.clone()).collect();

    for (position, (file, paths)) in papers.into_iter().enumerate() {
        let extractor = Arc::clone(&extractor);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let summary = match semaphore.acquire_owned().await {
                Ok(_permit) => match process_paper(&extractor, &file, &paths, transcript).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        error!("{:#}", e);
                        PaperSummary::failed(&file, format!("{:#}", e))
                    }
                },
                Err(e) => PaperSummary::failed(&file, e.to_string()),
            };
            (position, summary)
        });
    }

    let mut slots: Vec<Option<PaperSummary>> = vec![None; files.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, summary)) => slots[position] = Some(summary),
            Err(e) => error!("Extraction task aborted: {}", e),
        }
    }

    slots
        .into_iter()
        .zip(files)
        .map(|(slot, file)| {
            slot.unwrap_or_else(|| PaperSummary::failed(&file, "extraction task aborted".to_string()))
        })
        .collect()
}

async fn process_paper<S, Z>(
    extractor: &Extractor<S, Z>,
    file: &Path,
    paths: &ResultPaths,
    transcript: bool,
) -> anyhow::Result<PaperSummary>
where
    S: ReasoningService + ?Sized,
    Z: Sleeper + Clone,
{
    info!("Starting extraction for {}", file.display());

    let document =
        Document::open(file).with_context(|| format!("Failed to load {}", file.display()))?;
    let report = extractor
        .extract(&document)
        .await
        .with_context(|| format!("Extraction failed for {}", file.display()))?;

    if report.outcome.is_partial() {
        warn!(
            "{}: {}, keeping {} finding(s)",
            file.display(),
            report.outcome,
            report.finding_count()
        );
    }

    write_results(paths, &document, &report, transcript)
        .with_context(|| format!("Failed to write results for {}", file.display()))?;

    info!(
        findings = report.finding_count(),
        round_trips = report.round_trips,
        "Finished {}",
        file.display()
    );
    Ok(PaperSummary::finished(file, paths, &report))
}
