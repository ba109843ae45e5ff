//! Table block to CSV serialization

use crate::error::DocumentError;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());

/// Text of one cell: every text fragment trimmed, empty fragments dropped, joined.
pub(crate) fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Serialize every row of a table block as CSV (CRLF records, minimal quoting).
///
/// Rows without any cell are skipped.
pub(crate) fn table_to_csv(block: ElementRef<'_>) -> Result<String, DocumentError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    for row in block.select(&ROW) {
        let cells: Vec<String> = row.select(&CELL).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        writer
            .write_record(&cells)
            .map_err(|e| DocumentError::Csv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DocumentError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DocumentError::Csv(e.to_string()))
}
