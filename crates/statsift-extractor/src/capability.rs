//! Capabilities exposed to the reasoning service
//!
//! Four named, schema-typed operations. The service calls them by wire name; the
//! set parses the call into a [`Capability`], runs it against the document or the
//! accumulator, and always answers with text. Resolution failures, unknown names
//! and malformed arguments become descriptive tool results so the service can
//! correct itself on the next turn.

use crate::accumulator::ResultAccumulator;
use crate::error::CapabilityError;
use serde_json::{json, Map, Value};
use statsift_document::Document;
use statsift_domain::{CapabilitySchema, Finding, ToolCall};
use tracing::{debug, info};

/// Wire name of the section reader
pub const READ_SECTION: &str = "read_section";
/// Wire name of the table reader
pub const READ_TABLE: &str = "read_table";
/// Wire name of the finding reporter
pub const REPORT_TEST: &str = "report_test";
/// Wire name of the terminal capability
pub const REPORT_FINAL: &str = "report_final";

/// Every capability name, in advertised order
pub const CAPABILITY_NAMES: [&str; 4] = [READ_SECTION, READ_TABLE, REPORT_TEST, REPORT_FINAL];

/// Acknowledgment returned by `report_test`
pub const REPORT_ACK: &str = "Test report successful";

/// Acknowledgment returned by `report_final`
pub const FINAL_ACK: &str = "Final report received.";

const TABLE_PREAMBLE: &str = "You will be processing the table row by row. For each row, you need to extract the information as told in the first prompt:
After extracting all this information for one row, use the `report_test` tool to report the results, and only after that, proceed to the next row. Do not extract information for multiple rows at once.
It is very important to include non-significant results if they have effect sizes.
The title of the table is: ";

/// A parsed capability call
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// Read a section by address, falling back to a title suffix
    ReadSection {
        /// Address or title suffix
        index: String,
    },
    /// Read a table by its numeric address
    ReadTable {
        /// Table address
        index: String,
    },
    /// Record one finding
    ReportTest {
        /// The reported test
        finding: Box<Finding>,
        /// Whether this is the last report
        final_report: bool,
    },
    /// Signal that every finding has been reported
    ReportFinal {
        /// Optional closing remark
        summary: Option<String>,
    },
}

impl Capability {
    /// Parse a tool call into a capability
    pub(crate) fn from_call(call: &ToolCall) -> Result<Self, CapabilityError> {
        let invalid = |detail: String| CapabilityError::InvalidArguments {
            name: call.name.clone(),
            detail,
        };

        match call.name.as_str() {
            READ_SECTION => Ok(Capability::ReadSection {
                index: index_argument(&call.arguments).map_err(invalid)?,
            }),
            READ_TABLE => Ok(Capability::ReadTable {
                index: index_argument(&call.arguments).map_err(invalid)?,
            }),
            REPORT_TEST => {
                let (finding, final_report) = report_arguments(&call.arguments).map_err(invalid)?;
                Ok(Capability::ReportTest {
                    finding: Box::new(finding),
                    final_report,
                })
            }
            REPORT_FINAL => Ok(Capability::ReportFinal {
                summary: call
                    .arguments
                    .get("summary")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            other => Err(CapabilityError::UnknownCapability {
                name: other.to_string(),
                available: CAPABILITY_NAMES.join(", "),
            }),
        }
    }

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            Capability::ReadSection { .. } => READ_SECTION,
            Capability::ReadTable { .. } => READ_TABLE,
            Capability::ReportTest { .. } => REPORT_TEST,
            Capability::ReportFinal { .. } => REPORT_FINAL,
        }
    }

    /// Whether executing this call ends the extraction loop
    pub fn is_terminal(&self) -> bool {
        match self {
            Capability::ReportTest { final_report, .. } => *final_report,
            Capability::ReportFinal { .. } => true,
            _ => false,
        }
    }
}

fn arguments_object(arguments: &Value) -> Result<&Map<String, Value>, String> {
    arguments
        .as_object()
        .ok_or_else(|| format!("expected a JSON object, got {}", arguments))
}

/// The `index` argument; numbers are accepted and stringified
fn index_argument(arguments: &Value) -> Result<String, String> {
    match arguments_object(arguments)?.get("index") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(format!("'index' must be a string, got {}", other)),
        None => Err("missing required field 'index'".to_string()),
    }
}

fn report_arguments(arguments: &Value) -> Result<(Finding, bool), String> {
    let mut fields = arguments_object(arguments)?.clone();

    let final_report = match fields.remove("final_report") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        Some(other) => return Err(format!("'final_report' must be a boolean, got {}", other)),
    };

    let finding = serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())?;
    Ok((finding, final_report))
}

/// Text and terminal flag produced by one capability call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityOutput {
    /// Tool-result text shown to the service
    pub content: String,
    /// Whether the loop must stop after this tool turn
    pub terminal: bool,
}

impl CapabilityOutput {
    fn reply(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            terminal: false,
        }
    }
}

/// The capabilities bound to one document
pub struct CapabilitySet<'a> {
    document: &'a Document,
}

impl<'a> CapabilitySet<'a> {
    /// Bind the capabilities to a document
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Schemas advertised to the reasoning service
    pub fn schemas() -> Vec<CapabilitySchema> {
        let effect_sizes = json!({
            "type": "array",
            "description": "List of effect sizes.",
            "items": {
                "type": "object",
                "properties": {
                    "effectsize_measure": {"type": "string", "description": "The measure of the effect size."},
                    "value": {"type": "string", "description": "The value of the effect size."},
                    "CI": {
                        "type": "object",
                        "properties": {
                            "lower": {"type": "string", "description": "The lower bound of the confidence interval."},
                            "upper": {"type": "string", "description": "The upper bound of the confidence interval."},
                            "CI_type": {"type": "string", "description": "The type of the confidence interval."}
                        },
                        "required": ["lower", "upper", "CI_type"]
                    }
                },
                "required": ["effectsize_measure", "value", "CI"]
            }
        });

        vec![
            CapabilitySchema::new(
                READ_SECTION,
                "Provides the text of a section or subsection of a paper.\nSpecify which section by using the index argument.",
                json!({
                    "type": "object",
                    "properties": {
                        "index": {"type": "string", "description": "The index of the section or subsection you want to read."}
                    },
                    "required": ["index"]
                }),
            ),
            CapabilitySchema::new(
                READ_TABLE,
                "Provides the csv code for a table from a research paper.\nSpecify which table by using the index argument.",
                json!({
                    "type": "object",
                    "properties": {
                        "index": {"type": "string", "description": "The index of the table you want to read."}
                    },
                    "required": ["index"]
                }),
            ),
            CapabilitySchema::new(
                REPORT_TEST,
                "Reports a test. If you don't have a value for a field, submit UNKNOWN as the value. Set final_report to true on the last test of the paper.",
                json!({
                    "type": "object",
                    "properties": {
                        "test_name": {"type": "string", "description": "The full name of the statistic test."},
                        "test_N": {"type": "string", "description": "The number of participants."},
                        "num_conditions": {"type": "string", "description": "The number of conditions in the test. Report it exactly as in the text."},
                        "p_value": {"type": "string", "description": "The p value of the test."},
                        "effectsizes": effect_sizes.clone(),
                        "factors": {
                            "type": "array",
                            "description": "List the factors for each condition in the statistical test.",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "factor": {"type": "string", "description": "The name of the factor."},
                                    "p_value": {"type": "string", "description": "The p-value associated with the factor."},
                                    "effectsizes": effect_sizes
                                },
                                "required": ["factor", "p_value", "effectsizes"]
                            }
                        },
                        "final_report": {"type": "boolean", "description": "True if this is the last test to report."}
                    },
                    "required": ["test_name", "test_N", "num_conditions", "p_value", "effectsizes"]
                }),
            ),
            CapabilitySchema::new(
                REPORT_FINAL,
                "Call once every test of the paper has been reported. Ends the analysis.",
                json!({
                    "type": "object",
                    "properties": {
                        "summary": {"type": "string", "description": "Optional closing remark."}
                    }
                }),
            ),
        ]
    }

    /// Execute one call. Never fails: every error becomes the returned text.
    pub fn execute(&self, call: &ToolCall, accumulator: &mut ResultAccumulator) -> CapabilityOutput {
        info!(capability = %call.name, call_id = %call.id, "Executing capability");

        match self.try_execute(call, accumulator) {
            Ok(output) => output,
            Err(error) => {
                debug!(capability = %call.name, error = %error, "Capability call rejected");
                CapabilityOutput::reply(error.to_string())
            }
        }
    }

    fn try_execute(
        &self,
        call: &ToolCall,
        accumulator: &mut ResultAccumulator,
    ) -> Result<CapabilityOutput, CapabilityError> {
        let capability = Capability::from_call(call)?;
        let terminal = capability.is_terminal();

        let content = match capability {
            Capability::ReadSection { index } => self
                .document
                .section_text(&index)
                .map_err(|_| CapabilityError::NotFound("section"))?
                .to_string(),
            Capability::ReadTable { index } => {
                let (caption, csv) = self
                    .document
                    .table_csv(&index)
                    .map_err(|_| CapabilityError::NotFound("table"))?;
                format!("{}{}\nAnd here is the table as CSV: \n{}", TABLE_PREAMBLE, caption, csv)
            }
            Capability::ReportTest { finding, .. } => {
                let total = accumulator.record(*finding);
                debug!(total, "Finding recorded");
                REPORT_ACK.to_string()
            }
            Capability::ReportFinal { summary } => {
                if let Some(summary) = summary {
                    debug!(summary = %summary, "Final report");
                }
                FINAL_ACK.to_string()
            }
        };

        Ok(CapabilityOutput { content, terminal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statsift_domain::UNKNOWN;

    const PAPER: &str = r#"<html><head><title>T</title></head><body>
        <section id="sec-4"><h2><span class="section-number">2</span> Method</h2><p>Design.</p>
          <section id="sec-5"><h3><span class="section-number">2.1</span> Participants</h3>
            <p>Sixteen volunteers took part.</p></section>
        </section></body></html>"#;

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall::new("call_1", name, arguments)
    }

    fn run(call: &ToolCall) -> (CapabilityOutput, ResultAccumulator) {
        let document = Document::from_html(PAPER).unwrap();
        let set = CapabilitySet::new(&document);
        let mut acc = ResultAccumulator::new();
        let output = set.execute(call, &mut acc);
        (output, acc)
    }

    #[test]
    fn test_schemas_cover_every_capability() {
        let names: Vec<String> = CapabilitySet::schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, CAPABILITY_NAMES);
    }

    #[test]
    fn test_read_section() {
        let (output, _) = run(&call(READ_SECTION, json!({"index": "2.1"})));
        assert!(output.content.contains("Sixteen volunteers"));
        assert!(!output.terminal);

        let (output, _) = run(&call(READ_SECTION, json!({"index": "99"})));
        assert_eq!(output.content, "Could not find section.");
    }

    #[test]
    fn test_read_table_not_found() {
        let (output, _) = run(&call(READ_TABLE, json!({"index": "1"})));
        assert_eq!(output.content, "Could not find table.");
    }

    #[test]
    fn test_numeric_index_accepted() {
        let (output, _) = run(&call(READ_SECTION, json!({"index": 2})));
        assert!(output.content.contains("Design."));
    }

    #[test]
    fn test_report_test() {
        let (output, acc) = run(&call(
            REPORT_TEST,
            json!({"test_name": "paired t-test", "test_N": 16, "p_value": ".004", "effectsizes": []}),
        ));
        assert_eq!(output.content, REPORT_ACK);
        assert!(!output.terminal);
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.findings()[0].sample_size, "16");
        assert_eq!(acc.findings()[0].num_conditions, UNKNOWN);
    }

    #[test]
    fn test_report_test_final_flag() {
        let (output, acc) = run(&call(
            REPORT_TEST,
            json!({"test_name": "ANOVA", "effectsizes": [], "final_report": "true"}),
        ));
        assert!(output.terminal);
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_report_final() {
        let (output, acc) = run(&call(REPORT_FINAL, json!({})));
        assert_eq!(output.content, FINAL_ACK);
        assert!(output.terminal);
        assert!(acc.is_empty());
    }

    #[test]
    fn test_unknown_capability() {
        let (output, _) = run(&call("write_final_dictionary", json!({})));
        assert_eq!(
            output.content,
            "Error: tool 'write_final_dictionary' does not exist. Available tools: read_section, read_table, report_test, report_final"
        );
        assert!(!output.terminal);
    }

    #[test]
    fn test_invalid_arguments() {
        let (output, _) = run(&call(READ_SECTION, json!({})));
        assert_eq!(
            output.content,
            "Error: invalid arguments for 'read_section': missing required field 'index'"
        );

        let (output, acc) = run(&call(REPORT_TEST, json!("{not json")));
        assert!(output.content.starts_with("Error: invalid arguments for 'report_test'"));
        assert!(acc.is_empty());

        let (output, acc) = run(&call(REPORT_TEST, json!({"effectsizes": "large"})));
        assert!(output.content.starts_with("Error: invalid arguments for 'report_test'"));
        assert!(acc.is_empty());
    }

    #[test]
    fn test_terminal_flags() {
        let final_call = Capability::from_call(&call(REPORT_FINAL, json!({"summary": "done"}))).unwrap();
        assert!(final_call.is_terminal());
        assert_eq!(final_call.name(), REPORT_FINAL);

        let read = Capability::from_call(&call(READ_TABLE, json!({"index": "3"}))).unwrap();
        assert!(!read.is_terminal());
    }
}
