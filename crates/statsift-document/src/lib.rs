//! Statsift Document Index
//!
//! Builds a canonical, addressable view of a scientific paper stored as HTML
//! (ACM Digital Library full-text layout) so that sections and tables can be
//! requested by the numbering a reader sees in the paper.
//!
//! # Overview
//!
//! ```text
//! HTML → Document::from_html → sections (address, title) + tables (address, caption)
//!                            → section_text(address | title suffix)
//!                            → table_csv(address)
//! ```
//!
//! The document is parsed exactly once. Section text and table CSV are computed at
//! build time, so a [`Document`] is plain owned data: immutable, `Send` and `Sync`.
//!
//! # Example Usage
//!
//! ```
//! use statsift_document::Document;
//!
//! let html = r#"<html><head><title>A Study</title></head><body>
//!   <section id="sec-3"><header><div class="title-info"><h2>
//!     <span class="section-number">2</span> Method</h2></div></header>
//!     <p>We recruited 24 participants [4, 9].</p>
//!   </section></body></html>"#;
//!
//! let doc = Document::from_html(html)?;
//! assert_eq!(doc.index().sections[0].address, "2");
//! assert!(doc.section_text("2")?.contains("[4,9]"));
//! assert!(doc.section_text("99").is_err());
//! # Ok::<(), statsift_document::DocumentError>(())
//! ```

#![warn(missing_docs)]

mod citation;
mod document;
mod error;
mod index;
mod table;

pub use citation::normalize_citations;
pub use document::{Document, DocumentIndex, Section, Table};
pub use error::DocumentError;
pub use index::EXCLUDED_SECTION_KEYWORDS;
