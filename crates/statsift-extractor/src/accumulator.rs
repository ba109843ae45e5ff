//! Append-only sink for reported findings

use statsift_domain::Finding;

/// Findings reported during one extraction run, in call order
#[derive(Debug, Clone, Default)]
pub struct ResultAccumulator {
    findings: Vec<Finding>,
}

impl ResultAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding and return the new total
    pub fn record(&mut self, finding: Finding) -> usize {
        self.findings.push(finding);
        self.findings.len()
    }

    /// Findings so far
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Number of findings so far
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Whether nothing was reported yet
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Hand the findings to the caller
    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}
