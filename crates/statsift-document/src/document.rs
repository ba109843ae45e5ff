//! The immutable, indexed paper

use crate::error::DocumentError;
use crate::index::{collapse_whitespace, index_sections, index_tables, IndexedSection, IndexedTable};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static ABSTRACT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.abstract").unwrap());
static DOI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:doi\.org/|doi:\s*)(10\.\d{4,9}/[^\s"'<>]+)"#).unwrap()
});

/// One addressable section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Visible numbering, e.g. "3.2"; empty for unnumbered sections
    pub address: String,
    /// Heading text without the number
    pub title: String,
    /// Position in document order
    pub order: usize,
}

/// One addressable table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Numeric id taken from the table anchor
    pub address: String,
    /// Caption title, empty if the table has none
    pub caption: String,
    /// Position in document order
    pub order: usize,
}

/// The ordered section and table entries of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentIndex {
    /// Sections in document order
    pub sections: Vec<Section>,
    /// Tables in document order
    pub tables: Vec<Table>,
}

/// A parsed and indexed paper
///
/// Built once from HTML and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Document {
    title: Option<String>,
    abstract_text: Option<String>,
    doi: Option<String>,
    sections: Vec<IndexedSection>,
    tables: Vec<IndexedTable>,
}

impl Document {
    /// Parse and index an HTML paper
    pub fn from_html(html: &str) -> Result<Self, DocumentError> {
        let parsed = Html::parse_document(html);

        let title = parsed
            .select(&TITLE)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty());
        let abstract_text = parsed
            .select(&ABSTRACT)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());
        let doi = DOI.captures(html).map(|caps| {
            caps[1]
                .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ')'))
                .to_string()
        });

        let sections = index_sections(&parsed);
        let tables = index_tables(&parsed)?;

        info!(
            "Indexed document: {} sections, {} tables",
            sections.len(),
            tables.len()
        );

        Ok(Self {
            title,
            abstract_text,
            doi,
            sections,
            tables,
        })
    }

    /// Read and index an HTML paper from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_html(&html)
    }

    /// Paper title from `<title>`
    pub fn title(&self) -> Result<&str, DocumentError> {
        self.title
            .as_deref()
            .ok_or(DocumentError::MissingElement("title"))
    }

    /// Abstract text
    pub fn abstract_text(&self) -> Result<&str, DocumentError> {
        self.abstract_text
            .as_deref()
            .ok_or(DocumentError::MissingElement("abstract"))
    }

    /// First DOI mentioned in the paper
    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }

    /// Ordered section and table entries
    pub fn index(&self) -> DocumentIndex {
        DocumentIndex {
            sections: self.sections().cloned().collect(),
            tables: self.tables().cloned().collect(),
        }
    }

    /// Sections in document order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().map(|s| &s.section)
    }

    /// Tables in document order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().map(|t| &t.table)
    }

    /// Text of a section, looked up by numeric address first, then by title suffix.
    ///
    /// Nested tables and figures are removed and citation groups normalized.
    pub fn section_text(&self, address_or_title: &str) -> Result<&str, DocumentError> {
        let query = address_or_title.trim();
        if query.is_empty() {
            return Err(DocumentError::SectionNotFound(address_or_title.to_string()));
        }

        self.sections
            .iter()
            .find(|s| !s.section.address.is_empty() && s.section.address == query)
            .or_else(|| self.sections.iter().find(|s| s.heading.ends_with(query)))
            .map(|s| s.text.as_str())
            .ok_or_else(|| DocumentError::SectionNotFound(query.to_string()))
    }

    /// Caption and CSV text of a table, looked up by its numeric address
    pub fn table_csv(&self, address: &str) -> Result<(&str, &str), DocumentError> {
        let query = address.trim();
        self.tables
            .iter()
            .find(|t| t.table.address == query)
            .map(|t| (t.table.caption.as_str(), t.csv.as_str()))
            .ok_or_else(|| DocumentError::TableNotFound(query.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = r#"<html><head><title>
        Typing on Glass
    </title></head><body>
    <div class="abstract"><p>We compare two keyboards.</p></div>
    <p>DOI: https://doi.org/10.1145/3544548.3580810.</p>
    <section id="sec-2"><header><div class="title-info"><h2><span class="section-number">1</span> Introduction</h2></div></header>
      <p>Prior work [3, 8].</p></section>
    <section id="sec-5"><header><div class="title-info"><h2><span class="section-number">2</span> Method</h2></div></header>
      <p>Overview.</p>
      <section id="sec-6"><header><div class="title-info"><h3><span class="section-number">2.1</span> Participants</h3></div></header>
        <p>Twenty-four participants took part.</p></section>
    </section>
    <section id="sec-9"><header><div class="title-info"><h2>References</h2></div></header><p>[1] Someone.</p></section>
    </body></html>"#;

    #[test]
    fn test_metadata() {
        let doc = Document::from_html(PAPER).unwrap();
        assert_eq!(doc.title().unwrap(), "Typing on Glass");
        assert_eq!(doc.abstract_text().unwrap(), "We compare two keyboards.");
        assert_eq!(doc.doi(), Some("10.1145/3544548.3580810"));
    }

    #[test]
    fn test_missing_metadata() {
        let doc = Document::from_html("<html><body></body></html>").unwrap();
        assert!(matches!(doc.title(), Err(DocumentError::MissingElement("title"))));
        assert!(matches!(doc.abstract_text(), Err(DocumentError::MissingElement("abstract"))));
        assert_eq!(doc.doi(), None);
        assert!(doc.index().sections.is_empty());
    }

    #[test]
    fn test_index_order_and_exclusion() {
        let doc = Document::from_html(PAPER).unwrap();
        let index = doc.index();
        let entries: Vec<(&str, &str, usize)> = index
            .sections
            .iter()
            .map(|s| (s.address.as_str(), s.title.as_str(), s.order))
            .collect();
        assert_eq!(
            entries,
            vec![("1", "Introduction", 0), ("2", "Method", 1), ("2.1", "Participants", 2)]
        );
        assert!(index.tables.is_empty());
    }

    #[test]
    fn test_section_lookup() {
        let doc = Document::from_html(PAPER).unwrap();
        assert!(doc.section_text("2.1").unwrap().contains("Twenty-four participants"));
        assert!(doc.section_text("1").unwrap().contains("Prior work [3,8]."));
        // parent section text includes its subsections
        assert!(doc.section_text("2").unwrap().contains("Twenty-four"));
        // title suffix fallback
        assert!(doc.section_text("Participants").unwrap().contains("Twenty-four"));
        assert!(matches!(
            doc.section_text("99"),
            Err(DocumentError::SectionNotFound(q)) if q == "99"
        ));
        assert!(doc.section_text("References").is_err());
        assert!(doc.section_text("  ").is_err());
    }

    #[test]
    fn test_table_lookup_missing() {
        let doc = Document::from_html(PAPER).unwrap();
        let err = doc.table_csv("1").unwrap_err();
        assert!(err.is_not_found());
    }
}
