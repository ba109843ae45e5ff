//! CLI command definitions and argument parsing.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Statsift CLI - Extract reported statistical tests from scientific papers.
#[derive(Debug, Parser)]
#[command(name = "statsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STATSIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (paths and counts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract statistical tests from one or more HTML papers
    Extract(ExtractArgs),

    /// Show the section and table index of a paper
    Index(IndexArgs),

    /// Print a section or table exactly as the reasoning service sees it
    Read(ReadArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// HTML files to process
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory for result files (overrides output.results_dir)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Also write the conversation as markdown next to each result
    #[arg(short, long)]
    pub transcript: bool,

    /// Number of papers processed concurrently
    #[arg(short, long, default_value = "1")]
    pub jobs: usize,

    /// Re-run papers that already have a result file
    #[arg(long)]
    pub force: bool,

    /// Model to use (overrides service.model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Use the quick extractor preset (small budget, short waits)
    #[arg(long)]
    pub quick: bool,
}

/// Arguments for the index command.
#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// HTML file
    pub file: PathBuf,
}

/// Arguments for the read command.
#[derive(Debug, Parser)]
#[command(group(ArgGroup::new("target").required(true).args(["section", "table"])))]
pub struct ReadArgs {
    /// HTML file
    pub file: PathBuf,

    /// Section address ("3.2") or title suffix
    #[arg(short, long)]
    pub section: Option<String>,

    /// Table number
    #[arg(short, long)]
    pub table: Option<String>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from([
            "statsift", "extract", "a.html", "b.html", "--jobs", "4", "--transcript",
        ]);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.jobs, 4);
                assert!(args.transcript);
                assert!(!args.force);
                assert!(args.out_dir.is_none());
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_extract_requires_files() {
        assert!(Cli::try_parse_from(["statsift", "extract"]).is_err());
    }

    #[test]
    fn test_read_requires_exactly_one_target() {
        assert!(Cli::try_parse_from(["statsift", "read", "p.html"]).is_err());
        assert!(Cli::try_parse_from([
            "statsift", "read", "p.html", "--section", "2", "--table", "1",
        ])
        .is_err());

        let cli = Cli::parse_from(["statsift", "read", "p.html", "--table", "3"]);
        match cli.command {
            Command::Read(args) => {
                assert_eq!(args.table.as_deref(), Some("3"));
                assert!(args.section.is_none());
            }
            _ => panic!("Expected Read command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["statsift", "index", "p.html", "--format", "json", "--no-color"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Index(_)));
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["statsift", "config", "init", "--force"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            _ => panic!("Expected Config Init command"),
        }
    }
}
