//! Read command implementation.
//!
//! Runs the same capability the reasoning service would call, so the output is
//! byte-for-byte what the service receives, including "Could not find" replies.

use crate::cli::ReadArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use serde_json::json;
use statsift_document::Document;
use statsift_domain::ToolCall;
use statsift_extractor::{CapabilitySet, ResultAccumulator, READ_SECTION, READ_TABLE};

/// Execute the read command.
pub fn execute_read(args: ReadArgs, formatter: &Formatter) -> Result<()> {
    let call = read_call(&args)?;
    let document = Document::open(&args.file)?;

    let output = CapabilitySet::new(&document).execute(&call, &mut ResultAccumulator::new());
    println!("{}", formatter.format_read(&call.name, &output.content)?);
    Ok(())
}

fn read_call(args: &ReadArgs) -> Result<ToolCall> {
    match (&args.section, &args.table) {
        (Some(section), None) => Ok(ToolCall::new("cli", READ_SECTION, json!({ "index": section }))),
        (None, Some(table)) => Ok(ToolCall::new("cli", READ_TABLE, json!({ "index": table }))),
        _ => Err(CliError::InvalidInput(
            "Specify exactly one of --section or --table".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(section: Option<&str>, table: Option<&str>) -> ReadArgs {
        ReadArgs {
            file: PathBuf::from("p.html"),
            section: section.map(String::from),
            table: table.map(String::from),
        }
    }

    #[test]
    fn test_read_call_for_section() {
        let call = read_call(&args(Some("2.1"), None)).unwrap();
        assert_eq!(call.name, READ_SECTION);
        assert_eq!(call.arguments["index"], "2.1");
    }

    #[test]
    fn test_read_call_for_table() {
        let call = read_call(&args(None, Some("3"))).unwrap();
        assert_eq!(call.name, READ_TABLE);
    }

    #[test]
    fn test_read_call_needs_one_target() {
        assert!(read_call(&args(None, None)).is_err());
        assert!(read_call(&args(Some("1"), Some("1"))).is_err());
    }
}
