//! Checking observations against rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Observation, Rule, Verdict};
use crate::record::PatientRecord;
use crate::types::{AlgorithmDefinition, CheckResult, ConfigValue, ParameterConfig, format_number, parse_flag};

/// Inputs shared by every check of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Reference date for date rules
    pub today: NaiveDate,
}

impl EvaluationContext {
    /// Context anchored at the given date.
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::at(Utc::now().date_naive())
    }
}

/// Checks one observation against a sub-parameter config.
///
/// An invalid config fails the check instead of erroring, so that one bad
/// rule never hides the results of the others.
///
/// # Examples
///
/// ```
/// use labval_core::{EvaluationContext, Observation, ParameterConfig, Verdict};
/// use labval_core::rules::evaluate;
///
/// let config = ParameterConfig::range(Some(12.0), Some(16.0)).with_unit("g/dL");
/// let obs = Observation::new(13.2).with_unit("g/dL");
/// let ctx = EvaluationContext::default();
/// assert_eq!(evaluate(&config, Some(&obs), &ctx), Verdict::Pass);
/// ```
pub fn evaluate(
    config: &ParameterConfig,
    observation: Option<&Observation>,
    ctx: &EvaluationContext,
) -> Verdict {
    let rule = match config.rule() {
        Ok(rule) => rule,
        Err(e) => {
            tracing::warn!(error = %e, kind = %config.kind, "Invalid rule configuration");
            return Verdict::fail(format!("invalid rule: {e}"));
        }
    };
    let Some(observation) = observation else {
        return if config.required {
            Verdict::Missing
        } else {
            Verdict::Skipped
        };
    };
    if let (Some(expected), Some(actual)) = (&config.unit, &observation.unit)
        && expected.trim().to_lowercase() != actual.trim().to_lowercase()
    {
        return Verdict::fail(format!(
            "unit mismatch: expected {}, got {}",
            expected.trim(),
            actual.trim()
        ));
    }
    rule.check(&observation.value, ctx)
}

impl Rule {
    /// Checks a value against the rule.
    pub fn check(&self, value: &ConfigValue, ctx: &EvaluationContext) -> Verdict {
        match self {
            Rule::Range { min, max } => {
                let Some(n) = value.as_number() else {
                    return Verdict::fail(format!("'{value}' is not numeric"));
                };
                check_bounds(n, *min, *max, "")
            }
            Rule::Exact(None) => Verdict::Pass,
            Rule::Exact(Some(expected)) => {
                let equal = match (expected.as_number(), value.as_number()) {
                    (Some(a), Some(b)) => a == b,
                    _ => expected.as_text().trim() == value.as_text().trim(),
                };
                if equal {
                    Verdict::Pass
                } else {
                    Verdict::fail(format!("expected {expected}, got {value}"))
                }
            }
            Rule::Contains(None) => Verdict::Pass,
            Rule::Contains(Some(needle)) => {
                let haystack = value.as_text();
                if haystack.to_lowercase().contains(&needle.to_lowercase()) {
                    Verdict::Pass
                } else {
                    Verdict::fail(format!("'{haystack}' does not contain '{needle}'"))
                }
            }
            Rule::Boolean(expected) => {
                let actual = match value {
                    ConfigValue::Flag(b) => Some(*b),
                    ConfigValue::Text(s) => parse_flag(s),
                    ConfigValue::Number(_) => value.as_flag(),
                };
                match actual {
                    Some(actual) if actual == *expected => Verdict::Pass,
                    Some(actual) => Verdict::fail(format!("expected {expected}, got {actual}")),
                    None => Verdict::fail(format!("'{value}' is not a boolean")),
                }
            }
            Rule::List(options) if options.is_empty() => Verdict::Pass,
            Rule::List(options) => {
                let text = value.as_text();
                let text = text.trim();
                let folded = text.to_lowercase();
                if options.iter().any(|o| o.trim().to_lowercase() == folded) {
                    Verdict::Pass
                } else {
                    Verdict::fail(format!("'{text}' not in [{}]", options.join(", ")))
                }
            }
            Rule::Date { min_days, max_days } => {
                let text = value.as_text();
                let Some(date) = parse_date(&text) else {
                    return Verdict::fail(format!("'{text}' is not a date"));
                };
                let days = (ctx.today - date).num_days();
                if days < 0 {
                    return Verdict::fail(format!("{date} is in the future"));
                }
                check_bounds(days as f64, *min_days, *max_days, " days")
            }
        }
    }
}

fn check_bounds(n: f64, min: Option<f64>, max: Option<f64>, suffix: &str) -> Verdict {
    if let Some(min) = min
        && n < min
    {
        return Verdict::fail(format!(
            "{}{suffix} below minimum {}",
            format_number(n),
            format_number(min)
        ));
    }
    if let Some(max) = max
        && n > max
    {
        return Verdict::fail(format!(
            "{}{suffix} above maximum {}",
            format_number(n),
            format_number(max)
        ));
    }
    Verdict::Pass
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Checks every sub-parameter of an algorithm against a patient record.
///
/// Sub-parameters without a rule are reported as skipped.
pub fn check_algorithm(
    definition: &AlgorithmDefinition,
    patient: &PatientRecord,
    ctx: &EvaluationContext,
) -> Vec<CheckResult> {
    let mut checks = Vec::with_capacity(definition.sub_parameter_count());
    for parameter in &definition.parameters {
        for sub in &parameter.sub_parameters {
            let (rule, required, verdict) = match &sub.config {
                Some(config) => (
                    config.summary(),
                    config.required,
                    evaluate(config, patient.observation(&parameter.name, &sub.param), ctx),
                ),
                None => ("none".to_string(), false, Verdict::Skipped),
            };
            checks.push(CheckResult {
                parameter: parameter.name.clone(),
                label: parameter.display_label().to_string(),
                sub_parameter: sub.param.clone(),
                rule,
                required,
                verdict,
            });
        }
    }
    checks
}
