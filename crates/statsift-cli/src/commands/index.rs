//! Index command implementation.

use crate::cli::IndexArgs;
use crate::error::Result;
use crate::output::Formatter;
use statsift_document::Document;

/// Execute the index command.
pub fn execute_index(args: IndexArgs, formatter: &Formatter) -> Result<()> {
    let document = Document::open(&args.file)?;
    println!("{}", formatter.format_index(&document.index())?);
    Ok(())
}
