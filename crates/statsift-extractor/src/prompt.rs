//! Prompt construction for the extraction run

use statsift_document::DocumentIndex;

const PERSONA: &str = "You are a statistics expert and want to conduct a meta-analysis based on the results of scientific papers. To do this, you need to extract important statistics from the tests reported in the scientific paper.";

const SYSTEM_RULES: &str = "Carefully heed the user's instructions.\nRespond using Markdown.";

const TASK_INSTRUCTIONS: &str = r#"You need to extract the number of participants in the study, i.e. the sample size.
For tests in the null hypothesis statistical testing paradigm, you need the following information for each individual test:
- the name of the hypothesis test
- the p-value, which can take on numeric values between 0 and 1 and is often denoted as being smaller < or larger > than a given value
- the effect size, which is a different measure depending on the hypothesis test used, and consists of a measure, sometimes denoted by a Greek letter and the actual numeric effect size value
- confidence intervals around the effect size, which consist of two numeric values, one smaller than the effect size and one larger than the effect size. Confidence intervals can be different types, with 95% confidence intervals being the most common. They are frequently abbreviated CI
- the number of participants whose data was used in this test. This will often be same as the sample size in the study, but not always. E.g. in post-hoc tests for independent samples, only the participants in the conditions compared in the post-hoc tests are relevant for those post-hoc tests. Or when only participants who fulfill a certain condition are considered for an analysis.

Depending on the type of test, you need to extract additional information.
Some tests will report multiple different effect sizes. You need to extract them all and if available, their confidence intervals.
Some tests, like regression analyses, will report multiple p-values and corresponding effect sizes and confidence intervals, for each factor involved in the analysis. You need to collect the information for each factor separately, but it should still be identifiable to which test the factor belongs.
Some tests, like analyses of variance (ANOVAs) will report results (i.e. p-values, corresponding effect sizes and confidence intervals) separately for one or more main effects and one or more interaction effects. You need to collect the information for each effect separately, but it should still be identifiable to which test the factor belongs.

A combination of these is also possible, so that a test can have a p-value, effect sizes and confidence intervals associated with the test in general, also called omnibus test, and additional p-values, effect sizes and confidence intervals associated with each individual factor and effect in the test.

Any of the numeric values, such as p-values, effect sizes or confidence intervals can be missing. Sometimes these values are not stated explicitly for each test, e.g. tests with the same result may be summarized e.g. as: "All other comparisons were not significant". In that case, it is necessary to identify how many tests were conducted in total, e.g. by comparing how many conditions there are in total and how many are not yet accounted for by the reporting. Then list each non-significant test separately. If the numeric values cannot be extrapolated from the context, they should be considered missing and you need to state explicitly that the value is missing.

Other values (like names of hypothesis tests) may also be missing, in which case determine the value from the context as best as you can. Test statistics or descriptions in the method section, regarding the used tests in the data analysis or the study set-up (e.g. to determine whether repeated measures analyses were likely used, or which types of variables were measured) can be helpful.

Some values are only reported in tables. If the table's title or a reference in the text suggests relevant information in the table request it via the tool!

If the paper reports tests in a different statistical paradigm, e.g. using Bayes statistics, you also need information for each individual test:
- the name of the hypothesis test
- all other statistics associated with this hypothesis test, including names and values of the statistics"#;

const CLOSING_INSTRUCTIONS: &str = r#"Analyze the paper using your tools and make sure to report every test with its parameters.
Remember to also report effect sizes that are not explicitly stated including but not limited to:
- correlation coefficients.
- Odds Ratio (OR)
- Risk Ratio (RR)
- Related Measures

After extracting the information for a test (test name, effect size, amount participants, ...), **use the `report_test` tool immediately** to submit the test. Once the report is submitted, confirm with 'Report submitted' before proceeding to the next test.
Do not move forward until you have completed the report.

After reviewing the sections, have a look at the relevant tables.
When every test has been reported, call the `report_final` tool."#;

/// System prompt sent as the first message
pub fn system_prompt() -> String {
    format!("{}\n\n{}", PERSONA, SYSTEM_RULES)
}

/// Builds the task prompt for one paper
pub struct PromptBuilder<'a> {
    title: &'a str,
    abstract_text: &'a str,
    index: &'a DocumentIndex,
    include_persona: bool,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for a paper
    pub fn new(title: &'a str, abstract_text: &'a str, index: &'a DocumentIndex) -> Self {
        Self {
            title,
            abstract_text,
            index,
            include_persona: true,
        }
    }

    /// Whether to open with the persona paragraph
    pub fn with_persona(mut self, include: bool) -> Self {
        self.include_persona = include;
        self
    }

    /// Build the complete task prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        if self.include_persona {
            prompt.push_str(PERSONA);
            prompt.push_str("\n\n");
        }

        prompt.push_str(TASK_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&format!(
            "The paper you have to analyze has the title \"{}\".\n",
            self.title
        ));
        prompt.push_str(&format!(
            "Its abstract is the following:\n```\n{}\n```\n",
            self.abstract_text
        ));
        prompt.push_str(&format!(
            "It has the following sections:\n```\n{}\n```\n",
            self.section_listing()
        ));
        prompt.push_str(&format!(
            "And the following tables:\n```\n{}\n```\n\n",
            self.table_listing()
        ));

        prompt.push_str(CLOSING_INSTRUCTIONS);
        prompt
    }

    /// One line per section: `<address> <title>`
    fn section_listing(&self) -> String {
        if self.index.sections.is_empty() {
            return "(none)".to_string();
        }
        self.index
            .sections
            .iter()
            .map(|s| {
                if s.address.is_empty() {
                    s.title.clone()
                } else {
                    format!("{} {}", s.address, s.title)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One line per table: `Table <address>: <caption>`
    fn table_listing(&self) -> String {
        if self.index.tables.is_empty() {
            return "(none)".to_string();
        }
        self.index
            .tables
            .iter()
            .map(|t| format!("Table {}: {}", t.address, t.caption).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statsift_document::{Section, Table};

    fn index() -> DocumentIndex {
        DocumentIndex {
            sections: vec![
                Section {
                    address: "2".into(),
                    title: "Method".into(),
                    order: 0,
                },
                Section {
                    address: String::new(),
                    title: "Limitations".into(),
                    order: 1,
                },
            ],
            tables: vec![Table {
                address: "3".into(),
                caption: "Results".into(),
                order: 0,
            }],
        }
    }

    #[test]
    fn test_prompt_contains_paper_details() {
        let index = index();
        let prompt = PromptBuilder::new("Typing on Glass", "We compare keyboards.", &index).build();

        assert!(prompt.starts_with(PERSONA));
        assert!(prompt.contains("has the title \"Typing on Glass\""));
        assert!(prompt.contains("```\nWe compare keyboards.\n```"));
        assert!(prompt.contains("2 Method\nLimitations"));
        assert!(prompt.contains("Table 3: Results"));
        assert!(prompt.contains("report_final"));
    }

    #[test]
    fn test_prompt_without_persona() {
        let index = DocumentIndex {
            sections: Vec::new(),
            tables: Vec::new(),
        };
        let prompt = PromptBuilder::new("T", "A", &index).with_persona(false).build();
        assert!(!prompt.contains(PERSONA));
        assert!(prompt.contains("And the following tables:\n```\n(none)\n```"));
    }

    #[test]
    fn test_system_prompt() {
        let prompt = system_prompt();
        assert!(prompt.contains("statistics expert"));
        assert!(prompt.ends_with("Respond using Markdown."));
    }
}
