//! Parameter definitions offered by the algorithm builder.

use serde::Serialize;
use std::sync::LazyLock;

use crate::types::{ParameterConfig, ValidationType};

/// A known parameter with its default rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    /// Parameter name
    pub name: &'static str,
    /// Display label
    pub label: &'static str,
    /// Rule shape
    #[serde(rename = "type")]
    pub kind: ValidationType,
    /// Rule used when the parameter is added
    pub default_config: ParameterConfig,
    /// Whether the parameter describes the patient rather than a test
    pub is_global: bool,
    /// Grouping shown in the builder
    pub category: &'static str,
}

static DEFINITIONS: LazyLock<Vec<ParameterDefinition>> = LazyLock::new(|| {
    let def = |name: &'static str,
               label: &'static str,
               default_config: ParameterConfig,
               is_global: bool,
               category: &'static str| {
        ParameterDefinition {
            name,
            label,
            kind: default_config.kind,
            default_config,
            is_global,
            category,
        }
    };
    vec![
        def(
            "patient_age",
            "Patient Age",
            ParameterConfig::range(Some(0.0), Some(120.0))
                .with_unit("years")
                .required(),
            true,
            "Patient Info",
        ),
        def(
            "patient_gender",
            "Patient Gender",
            ParameterConfig::list(["Male", "Female", "Other"]).required(),
            true,
            "Patient Info",
        ),
        def(
            "result",
            "Test Result",
            ParameterConfig::range(Some(0.0), Some(100.0)).required(),
            false,
            "Results",
        ),
        def(
            "qc",
            "Quality Control",
            ParameterConfig::contains("normal").required(),
            false,
            "Quality",
        ),
        def(
            "unity",
            "Unit of Measurement",
            ParameterConfig::list(["g/L", "mg/dL", "mmol/L", "µmol/L", "IU/L"]).required(),
            false,
            "Results",
        ),
        def(
            "entecedent",
            "Previous Value",
            ParameterConfig::list(["LOW", "HIGH"]),
            false,
            "Medical History",
        ),
        def(
            "entecedent_date",
            "Days Since Previous Test",
            ParameterConfig::range(Some(0.0), Some(365.0)).with_unit("days"),
            false,
            "Medical History",
        ),
        def(
            "interparameter",
            "Linked Parameter",
            ParameterConfig::list(Vec::<String>::new()),
            false,
            "Relationships",
        ),
        def(
            "comments",
            "Comments",
            ParameterConfig::new(ValidationType::Contains),
            false,
            "Notes",
        ),
    ]
});

/// All parameter definitions.
pub fn parameter_definitions() -> &'static [ParameterDefinition] {
    &DEFINITIONS
}

/// Looks up a parameter definition by name.
pub fn find_parameter(name: &str) -> Option<&'static ParameterDefinition> {
    DEFINITIONS.iter().find(|d| d.name == name)
}

/// Definitions describing the patient.
pub fn global_parameter_definitions() -> impl Iterator<Item = &'static ParameterDefinition> {
    DEFINITIONS.iter().filter(|d| d.is_global)
}

/// Definitions describing a test.
pub fn specific_parameter_definitions() -> impl Iterator<Item = &'static ParameterDefinition> {
    DEFINITIONS.iter().filter(|d| !d.is_global)
}
