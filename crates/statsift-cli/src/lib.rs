//! Statsift CLI library.
//!
//! This library provides the core functionality for the `statsift` command-line
//! interface: configuration management, batch extraction, result persistence
//! and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod persist;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
