//! Citation group normalization

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static CITATION_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*(\d+(?:\s*,\s*\d+)*)\s*\]").unwrap());

static LIST_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Rewrite bracketed integer lists into canonical `[a,b,c]` form.
///
/// Idempotent: normalizing already-normalized text returns it unchanged.
///
/// # Examples
///
/// ```
/// use statsift_document::normalize_citations;
///
/// assert_eq!(normalize_citations("as shown [12, 7,3]."), "as shown [12,7,3].");
/// assert_eq!(normalize_citations("[ 5 ]"), "[5]");
/// assert_eq!(normalize_citations("[a, 2]"), "[a, 2]");
/// ```
pub fn normalize_citations(text: &str) -> Cow<'_, str> {
    CITATION_GROUP.replace_all(text, |caps: &Captures| {
        let numbers: Vec<&str> = LIST_SEPARATOR.split(&caps[1]).collect();
        format!("[{}]", numbers.join(","))
    })
}
