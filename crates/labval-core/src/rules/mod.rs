//! Rule interpreter.
//!
//! A [`ParameterConfig`] is first turned into a [`Rule`], which rejects
//! configurations that can never be satisfied, and the rule is then
//! checked against an [`Observation`] taken from a patient record.

mod evaluate;
mod observation;
mod proptests;

pub use evaluate::{EvaluationContext, check_algorithm, evaluate};
pub use observation::Observation;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{ConfigValue, ParameterConfig, ValidationType};

/// A validated rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Inclusive numeric bounds; `None` is unbounded.
    Range {
        /// Lower bound
        min: Option<f64>,
        /// Upper bound
        max: Option<f64>,
    },
    /// Equality with the expected value; `None` accepts anything.
    Exact(Option<ConfigValue>),
    /// Case-insensitive substring; `None` accepts anything.
    Contains(Option<String>),
    /// Flag equal to the expected value.
    Boolean(bool),
    /// One of the options (case-insensitive); empty accepts anything.
    List(Vec<String>),
    /// Age of a date in days.
    Date {
        /// Minimum age in days
        min_days: Option<f64>,
        /// Maximum age in days
        max_days: Option<f64>,
    },
}

impl ParameterConfig {
    /// Validates the configuration and returns its rule.
    ///
    /// # Errors
    ///
    /// Returns a validation error on the `config` field when the bounds are
    /// inverted or a boolean rule carries a non-boolean value.
    pub fn rule(&self) -> Result<Rule> {
        let bounds = |min: Option<f64>, max: Option<f64>| match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => Err(Error::validation_field(
                "config",
                format!("Minimum ({lo}) must not exceed maximum ({hi})"),
            )),
            _ => Ok((min, max)),
        };

        let rule = match self.kind {
            ValidationType::Range => {
                let (min, max) = bounds(self.min, self.max)?;
                Rule::Range { min, max }
            }
            ValidationType::Exact => Rule::Exact(self.value.clone()),
            ValidationType::Contains => Rule::Contains(
                self.value
                    .as_ref()
                    .map(ConfigValue::as_text)
                    .filter(|s| !s.trim().is_empty()),
            ),
            ValidationType::Boolean => match &self.value {
                None => Rule::Boolean(true),
                Some(value) => Rule::Boolean(value.as_flag().ok_or_else(|| {
                    Error::validation_field(
                        "config",
                        format!("Boolean rule expects true or false, got '{value}'"),
                    )
                })?),
            },
            ValidationType::List => Rule::List(self.options.clone().unwrap_or_default()),
            ValidationType::Date => {
                let (min_days, max_days) = bounds(self.min, self.max)?;
                Rule::Date { min_days, max_days }
            }
        };
        Ok(rule)
    }
}

/// Result of checking one observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Verdict {
    /// The observation satisfies the rule.
    Pass,
    /// The observation violates the rule.
    Fail {
        /// Why the check failed
        reason: String,
    },
    /// A required observation is absent.
    Missing,
    /// An optional observation is absent, or the sub-parameter has no rule.
    Skipped,
}

impl Verdict {
    /// Creates a failing verdict.
    pub fn fail(reason: impl Into<String>) -> Self {
        Verdict::Fail {
            reason: reason.into(),
        }
    }

    /// Returns `true` for verdicts that count against validation.
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Fail { .. } | Verdict::Missing)
    }

    /// Short tag used in execution logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail { .. } => "FAIL",
            Verdict::Missing => "MISSING",
            Verdict::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Fail { reason } => write!(f, "FAIL ({reason})"),
            other => f.write_str(other.tag()),
        }
    }
}
