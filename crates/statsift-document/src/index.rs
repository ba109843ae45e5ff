//! Single-pass index construction over the parsed HTML tree

use crate::citation::normalize_citations;
use crate::document::{Section, Table};
use crate::error::DocumentError;
use crate::table::table_to_csv;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Title keywords (lower case, substring match) of sections that are never indexed
pub const EXCLUDED_SECTION_KEYWORDS: &[&str] = &[
    "references",
    "acknowledgments",
    "acknowledgements",
    "acknoweldgements",
    "footnote",
    "appendix",
];

static SECTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"section[id^="sec"]"#).unwrap());
static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2, h3, h4").unwrap());
static SECTION_NUMBER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".section-number").unwrap());
static TABLE_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.table-responsive").unwrap());
static TABLE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.table-caption span.table-title").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// A section with its precomputed lookup data
#[derive(Debug, Clone)]
pub(crate) struct IndexedSection {
    pub section: Section,
    /// Full heading text (number and title), used for title-suffix lookup
    pub heading: String,
    /// Normalized text with tables and figures removed
    pub text: String,
}

/// A table with its precomputed CSV
#[derive(Debug, Clone)]
pub(crate) struct IndexedTable {
    pub table: Table,
    pub csv: String,
}

/// Whether a section title falls into an excluded category
pub(crate) fn is_excluded_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    EXCLUDED_SECTION_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_section(element: &ElementRef<'_>) -> bool {
    element.value().name() == "section"
        && element
            .value()
            .attr("id")
            .is_some_and(|id| id.starts_with("sec"))
}

/// Nearest enclosing `section[id^=sec]` of an element, excluding the element itself
fn enclosing_section<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(is_section)
}

/// Whether the element is a table block or figure whose text never belongs to a section
fn is_stripped_block(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    value.name() == "figure"
        || (value.name() == "div" && value.classes().any(|class| class == "table-responsive"))
}

/// Concatenate the text of a subtree, skipping table blocks and figures.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !is_stripped_block(&child_element) {
                collect_text(child_element, out);
            }
        }
    }
}

/// Text of a section with nested tables and figures removed and citations normalized
pub(crate) fn section_body(section: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(section, &mut raw);
    normalize_citations(&raw).into_owned()
}

/// The heading that belongs to this section rather than to a nested one
fn own_heading<'a>(section: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    section.select(&HEADING).find(|heading| {
        enclosing_section(heading).is_some_and(|owner| (*owner).id() == (**section).id())
    })
}

/// Build the ordered section list.
pub(crate) fn index_sections(html: &Html) -> Vec<IndexedSection> {
    let mut sections = Vec::new();
    let mut excluded = HashSet::new();
    let mut seen_addresses = HashSet::new();

    for element in html.select(&SECTION) {
        let inside_excluded = element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| excluded.contains(&(*ancestor).id()));
        if inside_excluded {
            excluded.insert((*element).id());
            continue;
        }

        let Some(heading) = own_heading(&element) else {
            debug!(id = ?element.value().attr("id"), "Section without heading skipped");
            continue;
        };

        let heading_text = collapse_whitespace(&heading.text().collect::<String>());
        let address = heading
            .select(&SECTION_NUMBER)
            .next()
            .map(|number| collapse_whitespace(&number.text().collect::<String>()))
            .unwrap_or_default();
        let title = if address.is_empty() {
            heading_text.clone()
        } else {
            heading_text.replacen(&address, "", 1).trim().to_string()
        };

        if is_excluded_title(&title) {
            debug!(title = %title, "Excluded section");
            excluded.insert((*element).id());
            continue;
        }

        if !address.is_empty() && !seen_addresses.insert(address.clone()) {
            debug!(address = %address, "Duplicate section address skipped");
            continue;
        }

        sections.push(IndexedSection {
            section: Section {
                address,
                title,
                order: sections.len(),
            },
            heading: heading_text,
            text: section_body(element),
        });
    }

    sections
}

/// Build the ordered table list.
pub(crate) fn index_tables(html: &Html) -> Result<Vec<IndexedTable>, DocumentError> {
    let mut tables = Vec::new();

    for block in html.select(&TABLE_BLOCK) {
        let id = block.value().attr("id").unwrap_or_default();
        if !id.contains("tab") {
            continue;
        }
        let Some(address) = DIGITS.find(id).map(|m| m.as_str().to_string()) else {
            debug!(id = %id, "Table anchor without number skipped");
            continue;
        };

        let caption = block
            .select(&TABLE_TITLE)
            .next()
            .map(|title| collapse_whitespace(&title.text().collect::<String>()))
            .unwrap_or_default();

        tables.push(IndexedTable {
            table: Table {
                address,
                caption,
                order: tables.len(),
            },
            csv: table_to_csv(block)?,
        });
    }

    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_titles() {
        assert!(is_excluded_title("REFERENCES"));
        assert!(is_excluded_title("Acknowledgments"));
        assert!(is_excluded_title("A Appendix: Questionnaire"));
        assert!(is_excluded_title("Footnotes"));
        assert!(!is_excluded_title("Results"));
    }

    #[test]
    fn test_collect_text_strips_blocks() {
        let html = Html::parse_fragment(
            r#"<section id="sec-1"><p>Before</p><figure><figcaption>Fig</figcaption></figure>
               <div class="table-responsive" id="tab1"><table><tr><td>cell</td></tr></table></div>
               <p>After [1 , 2]</p></section>"#,
        );
        let section = html.select(&SECTION).next().unwrap();
        let body = section_body(section);
        assert!(body.contains("Before"));
        assert!(body.contains("After [1,2]"));
        assert!(!body.contains("Fig"));
        assert!(!body.contains("cell"));
    }

    #[test]
    fn test_nested_heading_not_taken() {
        let html = Html::parse_document(
            r#"<section id="sec-1"><section id="sec-2"><h3><span class="section-number">1.1</span> Inner</h3></section></section>"#,
        );
        let sections = index_sections(&html);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section.address, "1.1");
    }
}
