//! Finding module - the structured statistical test record
//!
//! A [`Finding`] is what the reasoning service reports for each hypothesis test it
//! locates in a paper. The serde field names are the wire contract shared with the
//! service and with downstream meta-analysis tooling, so they keep their historic
//! spelling (`test_N` on input, `N` on output, `effectsizes`, `CI`, `CI_type`).
//!
//! Every value is a string. The service may answer [`UNKNOWN`] for anything it
//! cannot resolve; that is a valid, terminal value rather than an error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sentinel for a field the reasoning service could not resolve
pub const UNKNOWN: &str = "UNKNOWN";

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Accept strings, numbers and booleans; map null, missing and blank values to UNKNOWN.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => unknown(),
        Some(Value::String(s)) if s.trim().is_empty() => unknown(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    })
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Confidence interval around an effect size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub lower: String,

    /// Upper bound
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub upper: String,

    /// Interval type, e.g. "95%"
    #[serde(rename = "CI_type", default = "unknown", deserialize_with = "lenient_string")]
    pub ci_type: String,
}

impl Default for ConfidenceInterval {
    fn default() -> Self {
        Self {
            lower: unknown(),
            upper: unknown(),
            ci_type: unknown(),
        }
    }
}

/// One effect size measure and its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSize {
    /// Measure name, e.g. "Cohen's d" or "partial eta squared"
    #[serde(rename = "effectsize_measure", default = "unknown", deserialize_with = "lenient_string")]
    pub measure: String,

    /// Reported value
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub value: String,

    /// Confidence interval around the value
    #[serde(rename = "CI", default)]
    pub confidence_interval: ConfidenceInterval,
}

/// Per-factor (or per-effect) result within a larger test such as an ANOVA or regression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    /// Factor or effect name
    #[serde(rename = "factor", default = "unknown", deserialize_with = "lenient_string")]
    pub name: String,

    /// p-value for this factor
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub p_value: String,

    /// Effect sizes reported for this factor
    #[serde(rename = "effectsizes", default, deserialize_with = "lenient_vec")]
    pub effect_sizes: Vec<EffectSize>,
}

/// A single reported hypothesis test
///
/// # Examples
///
/// ```
/// use statsift_domain::{Finding, UNKNOWN};
///
/// let finding: Finding = serde_json::from_str(
///     r#"{"test_name": "Welch t-test", "test_N": 24, "p_value": "< .001", "effectsizes": []}"#,
/// ).unwrap();
/// assert_eq!(finding.sample_size, "24");
/// assert_eq!(finding.num_conditions, UNKNOWN);
///
/// let out = serde_json::to_value(&finding).unwrap();
/// assert_eq!(out["N"], "24");
/// assert!(out.get("factors").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Full name of the statistical test
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub test_name: String,

    /// Number of participants whose data entered this test
    #[serde(rename = "N", alias = "test_N", default = "unknown", deserialize_with = "lenient_string")]
    pub sample_size: String,

    /// Number of conditions, reported as written in the paper
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub num_conditions: String,

    /// p-value of the (omnibus) test
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub p_value: String,

    /// Effect sizes of the (omnibus) test
    #[serde(rename = "effectsizes", default, deserialize_with = "lenient_vec")]
    pub effect_sizes: Vec<EffectSize>,

    /// Per-factor results
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub factors: Vec<Factor>,
}

impl Default for Finding {
    fn default() -> Self {
        Self {
            test_name: unknown(),
            sample_size: unknown(),
            num_conditions: unknown(),
            p_value: unknown(),
            effect_sizes: Vec::new(),
            factors: Vec::new(),
        }
    }
}

impl Finding {
    /// Total number of effect sizes, omnibus plus per-factor
    pub fn effect_size_count(&self) -> usize {
        self.effect_sizes.len()
            + self
                .factors
                .iter()
                .map(|f| f.effect_sizes.len())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_input_with_factors() {
        let args = json!({
            "test_name": "two-way repeated measures ANOVA",
            "test_N": "18",
            "num_conditions": "4",
            "p_value": "UNKNOWN",
            "effectsizes": [],
            "factors": [{
                "factor": "Technique",
                "p_value": "< .01",
                "effectsizes": [{
                    "effectsize_measure": "partial eta squared",
                    "value": "0.41",
                    "CI": {"lower": "0.12", "upper": "0.60", "CI_type": "90%"}
                }]
            }]
        });

        let finding: Finding = serde_json::from_value(args).unwrap();
        assert_eq!(finding.sample_size, "18");
        assert_eq!(finding.factors.len(), 1);
        assert_eq!(finding.factors[0].name, "Technique");
        assert_eq!(finding.factors[0].effect_sizes[0].confidence_interval.ci_type, "90%");
        assert_eq!(finding.effect_size_count(), 1);
    }

    #[test]
    fn test_numbers_and_nulls_are_normalized() {
        let args = json!({
            "test_name": "Pearson correlation",
            "test_N": 42,
            "num_conditions": null,
            "p_value": 0.003,
            "effectsizes": [{"effectsize_measure": "r", "value": 0.46}]
        });

        let finding: Finding = serde_json::from_value(args).unwrap();
        assert_eq!(finding.sample_size, "42");
        assert_eq!(finding.num_conditions, UNKNOWN);
        assert_eq!(finding.p_value, "0.003");
        assert_eq!(finding.effect_sizes[0].value, "0.46");
        assert_eq!(finding.effect_sizes[0].confidence_interval, ConfidenceInterval::default());
    }

    #[test]
    fn test_missing_fields_default_to_unknown() {
        let finding: Finding = serde_json::from_value(json!({})).unwrap();
        assert_eq!(finding, Finding::default());
    }

    #[test]
    fn test_null_lists_become_empty() {
        let finding: Finding =
            serde_json::from_value(json!({"effectsizes": null, "factors": null})).unwrap();
        assert!(finding.effect_sizes.is_empty());
        assert!(finding.factors.is_empty());
    }

    #[test]
    fn test_output_keys() {
        let finding = Finding {
            test_name: "Wilcoxon signed-rank test".into(),
            sample_size: "12".into(),
            factors: vec![Factor {
                name: "Condition".into(),
                p_value: ".04".into(),
                effect_sizes: vec![],
            }],
            ..Finding::default()
        };

        let out = serde_json::to_value(&finding).unwrap();
        assert_eq!(out["test_name"], "Wilcoxon signed-rank test");
        assert_eq!(out["N"], "12");
        assert!(out.get("test_N").is_none());
        assert_eq!(out["factors"][0]["factor"], "Condition");
        assert!(out["effectsizes"].as_array().unwrap().is_empty());
    }
}
