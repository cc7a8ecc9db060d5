//! Results of checking a patient against an algorithm.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rules::Verdict;

/// Final decision for one algorithm (or a whole workflow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The result can be reported without review.
    Validated,
    /// A biologist has to look at the result.
    ExpertRequired,
    /// The algorithm does not apply to this patient.
    NotApplicable,
}

impl Outcome {
    /// Returns `true` for [`Outcome::Validated`].
    pub fn is_validated(&self) -> bool {
        matches!(self, Outcome::Validated)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Validated => "VALIDATED",
            Outcome::ExpertRequired => "EXPERT_REQUIRED",
            Outcome::NotApplicable => "NOT_APPLICABLE",
        };
        f.write_str(s)
    }
}

/// One sub-parameter checked against an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// Parameter name (e.g. `hemoglobine`)
    pub parameter: String,
    /// Parameter display label
    pub label: String,
    /// Sub-parameter name (e.g. `result`)
    pub sub_parameter: String,
    /// Rule summary (e.g. `range 12–16 g/dL`)
    pub rule: String,
    /// Whether the rule is required
    pub required: bool,
    /// What the check found
    pub verdict: Verdict,
}

impl CheckResult {
    /// Returns `true` when the check counts against validation.
    pub fn is_failure(&self) -> bool {
        self.verdict.is_failure()
    }

    /// Returns `true` when the check passed.
    pub fn passed(&self) -> bool {
        matches!(self.verdict, Verdict::Pass)
    }
}
