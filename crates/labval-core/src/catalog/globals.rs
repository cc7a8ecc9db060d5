//! Global (patient-level) parameters.

use serde::Serialize;
use serde_json::{Value, json};
use std::sync::LazyLock;

use crate::types::GlobalParameterValue;

/// Input shape of a global parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalParameterKind {
    /// Number between `min` and `max`
    Range,
    /// One of `options`
    List,
    /// Free text
    Text,
}

/// A patient-level parameter an algorithm can carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalParameter {
    /// Parameter name
    pub name: &'static str,
    /// Display label
    pub label: &'static str,
    /// Input shape
    #[serde(rename = "type")]
    pub kind: GlobalParameterKind,
    /// Value used when the parameter is added
    pub default_value: Value,
    /// Allowed values for lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<&'static str>>,
    /// Lower bound for ranges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound for ranges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Unit for ranges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

static GLOBALS: LazyLock<Vec<GlobalParameter>> = LazyLock::new(|| {
    vec![
        GlobalParameter {
            name: "patient_age",
            label: "Patient Age",
            kind: GlobalParameterKind::Range,
            default_value: json!(30),
            options: None,
            min: Some(0.0),
            max: Some(120.0),
            unit: Some("years"),
        },
        GlobalParameter {
            name: "patient_gender",
            label: "Patient Gender",
            kind: GlobalParameterKind::List,
            default_value: json!("M"),
            options: Some(vec!["M", "F"]),
            min: None,
            max: None,
            unit: None,
        },
        GlobalParameter {
            name: "questionnaire",
            label: "Questionnaire",
            kind: GlobalParameterKind::Text,
            default_value: json!(""),
            options: None,
            min: None,
            max: None,
            unit: None,
        },
    ]
});

/// All global parameters.
pub fn global_parameters() -> &'static [GlobalParameter] {
    &GLOBALS
}

/// Every global parameter set to its default value.
pub fn default_global_values() -> Vec<GlobalParameterValue> {
    GLOBALS
        .iter()
        .map(|g| GlobalParameterValue::new(g.name, g.default_value.clone()))
        .collect()
}
