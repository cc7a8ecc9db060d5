//! Validation rule configuration attached to a sub-parameter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationType {
    /// Numeric value between `min` and `max`.
    Range,
    /// Value equal to `value`.
    Exact,
    /// Text containing `value`.
    Contains,
    /// True/false flag equal to `value`.
    Boolean,
    /// One of `options`.
    List,
    /// Date whose age in days lies between `min` and `max`.
    Date,
}

impl ValidationType {
    /// All validation types, in display order.
    pub const ALL: [ValidationType; 6] = [
        ValidationType::Range,
        ValidationType::Exact,
        ValidationType::Contains,
        ValidationType::List,
        ValidationType::Boolean,
        ValidationType::Date,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ValidationType::Range => "Range (min-max)",
            ValidationType::Exact => "Exact Match",
            ValidationType::Contains => "Contains Text",
            ValidationType::Boolean => "True/False",
            ValidationType::List => "From List",
            ValidationType::Date => "Date",
        }
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationType::Range => "range",
            ValidationType::Exact => "exact",
            ValidationType::Contains => "contains",
            ValidationType::Boolean => "boolean",
            ValidationType::List => "list",
            ValidationType::Date => "date",
        };
        f.write_str(name)
    }
}

/// A scalar stored in a rule (`value` field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean flag
    Flag(bool),
    /// Number
    Number(f64),
    /// Free text
    Text(String),
}

impl ConfigValue {
    /// Numeric reading of the value, parsing text when possible.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            ConfigValue::Text(s) => s.trim().parse().ok(),
            ConfigValue::Flag(_) => None,
        }
    }

    /// Boolean reading of the value.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ConfigValue::Flag(b) => Some(*b),
            ConfigValue::Text(s) => parse_flag(s),
            ConfigValue::Number(n) if *n == 1.0 => Some(true),
            ConfigValue::Number(n) if *n == 0.0 => Some(false),
            ConfigValue::Number(_) => None,
        }
    }

    /// Text reading of the value.
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Flag(b) => write!(f, "{b}"),
            ConfigValue::Number(n) => write!(f, "{}", format_number(*n)),
            ConfigValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Text(s)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Flag(b)
    }
}

/// Parses the textual flag spellings accepted from instruments and forms.
pub(crate) fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Formats integral floats without a trailing `.0`.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Rule configuration of a sub-parameter.
///
/// Which fields matter depends on `type`: `min`/`max` for range and date,
/// `value` for exact, contains and boolean, `options` for list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterConfig {
    /// Rule shape
    #[serde(rename = "type")]
    pub kind: ValidationType,

    /// Lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Expected value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConfigValue>,

    /// Allowed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// Whether a missing observation counts as a failure
    #[serde(default)]
    pub required: bool,

    /// Measurement unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ParameterConfig {
    /// Creates an empty, optional config of the given type.
    pub fn new(kind: ValidationType) -> Self {
        Self {
            kind,
            min: None,
            max: None,
            value: None,
            options: None,
            required: false,
            unit: None,
        }
    }

    /// Range rule.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min,
            max,
            ..Self::new(ValidationType::Range)
        }
    }

    /// Exact-match rule.
    pub fn exact(value: impl Into<ConfigValue>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(ValidationType::Exact)
        }
    }

    /// Substring rule.
    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            value: Some(ConfigValue::Text(value.into())),
            ..Self::new(ValidationType::Contains)
        }
    }

    /// Boolean rule.
    pub fn boolean(expected: bool) -> Self {
        Self {
            value: Some(ConfigValue::Flag(expected)),
            ..Self::new(ValidationType::Boolean)
        }
    }

    /// List rule.
    pub fn list<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: Some(options.into_iter().map(Into::into).collect()),
            ..Self::new(ValidationType::List)
        }
    }

    /// Date rule bounding the age of a date in days.
    pub fn date(min_days: Option<f64>, max_days: Option<f64>) -> Self {
        Self {
            min: min_days,
            max: max_days,
            ..Self::new(ValidationType::Date)
        }
    }

    /// Marks the rule as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the measurement unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Short description used in execution logs, e.g. `range 5–15 M/µL`.
    pub fn summary(&self) -> String {
        let mut out = self.kind.to_string();
        match self.kind {
            ValidationType::Range | ValidationType::Date => {
                let lo = self.min.map(format_number).unwrap_or_else(|| "-∞".into());
                let hi = self.max.map(format_number).unwrap_or_else(|| "∞".into());
                out.push_str(&format!(" {lo}–{hi}"));
            }
            ValidationType::Exact | ValidationType::Contains | ValidationType::Boolean => {
                if let Some(value) = &self.value {
                    out.push_str(&format!(" \"{value}\""));
                }
            }
            ValidationType::List => {
                if let Some(options) = &self.options {
                    out.push_str(&format!(" [{}]", options.join(", ")));
                }
            }
        }
        if let Some(unit) = &self.unit {
            out.push(' ');
            out.push_str(unit);
        }
        out
    }
}

impl Default for ParameterConfig {
    /// The builder's blank sub-parameter config: optional exact match.
    fn default() -> Self {
        Self::new(ValidationType::Exact)
    }
}
