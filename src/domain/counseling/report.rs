//! Expert analysis reports.

use serde::{Deserialize, Serialize};

/// Prefix that marks a report standing in for a failed analysis.
pub const ERROR_MARKER_PREFIX: &str = "Error during analysis:";

/// Shown to the lead agent when no expert produced a report.
pub const NO_REPORTS_PLACEHOLDER: &str =
    "[Expert Reports]\nNo expert reports were generated for this turn.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportOutcome {
    Analysis(String),
    Failed(String),
}

/// One expert's contribution to a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertReport {
    pub expert_name: String,
    pub outcome: ReportOutcome,
}

impl ExpertReport {
    pub fn analysis(expert_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            expert_name: expert_name.into(),
            outcome: ReportOutcome::Analysis(text.into()),
        }
    }

    pub fn failed(expert_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            expert_name: expert_name.into(),
            outcome: ReportOutcome::Failed(reason.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ReportOutcome::Failed(_))
    }

    /// Report body as given to the lead agent. Failures carry the marker.
    pub fn body(&self) -> String {
        match &self.outcome {
            ReportOutcome::Analysis(text) => text.clone(),
            ReportOutcome::Failed(reason) => format!("{} {}", ERROR_MARKER_PREFIX, reason),
        }
    }
}

/// Labels and joins reports, or returns the "no reports" placeholder.
pub fn render_reports(reports: &[ExpertReport]) -> String {
    if reports.is_empty() {
        return NO_REPORTS_PLACEHOLDER.to_string();
    }
    reports
        .iter()
        .map(|report| format!("--- {} Report ---\n{}", report.expert_name, report.body()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
