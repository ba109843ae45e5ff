//! Property tests for citation normalization and section exclusion

use proptest::prelude::*;
use statsift_document::{normalize_citations, Document, EXCLUDED_SECTION_KEYWORDS};

fn citation_group() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(0u32..500, 1..5),
        prop::collection::vec("[ \n]{0,2}", 8),
    )
        .prop_map(|(numbers, pads)| {
            let mut out = String::from("[");
            out.push_str(&pads[0]);
            for (i, n) in numbers.iter().enumerate() {
                if i > 0 {
                    out.push_str(&pads[(i + 1) % pads.len()]);
                    out.push(',');
                    out.push_str(&pads[(i + 2) % pads.len()]);
                }
                out.push_str(&n.to_string());
            }
            out.push_str(&pads[7]);
            out.push(']');
            out
        })
}

proptest! {
    #[test]
    fn normalization_is_idempotent(text in ".{0,80}") {
        let once = normalize_citations(&text).into_owned();
        let twice = normalize_citations(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn citation_groups_become_canonical(prefix in "[a-z ]{0,10}", group in citation_group()) {
        let text = format!("{}{}", prefix, group);
        let normalized = normalize_citations(&text).into_owned();
        let tail = &normalized[prefix.len()..];
        prop_assert!(tail.starts_with('['));
        prop_assert!(tail.ends_with(']'));
        prop_assert!(!tail.contains(' '));
        prop_assert!(!tail.contains('\n'));
        let twice = normalize_citations(&normalized).into_owned();
        prop_assert_eq!(normalized, twice);
    }

    #[test]
    fn excluded_titles_never_indexed(
        keyword in prop::sample::select(EXCLUDED_SECTION_KEYWORDS.to_vec()),
        upper in any::<bool>(),
        prefix in "[A-Za-z]{0,6}",
        number in 1u32..9,
    ) {
        let keyword = if upper { keyword.to_uppercase() } else { keyword.to_string() };
        let title = format!("{} {}", prefix, keyword);
        let html = format!(
            r#"<html><body>
            <section id="sec-1"><h2><span class="section-number">{n}</span> {title}</h2><p>body</p></section>
            <section id="sec-2"><h2><span class="section-number">{m}</span> Results</h2><p>body</p></section>
            </body></html>"#,
            n = number,
            m = number + 10,
            title = title,
        );
        let doc = Document::from_html(&html).unwrap();
        let index = doc.index();
        prop_assert_eq!(index.sections.len(), 1);
        prop_assert_eq!(index.sections[0].title.as_str(), "Results");
        prop_assert!(doc.section_text(&number.to_string()).is_err());
    }
}
