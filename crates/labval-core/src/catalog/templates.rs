//! Algorithm templates.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::types::{AlgorithmDefinition, FinalAction, Parameter, ParameterConfig};

/// A preset algorithm body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmTemplate {
    /// Lookup key (`blood`, `urine`, ...)
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// Default parameters
    pub parameters: Vec<Parameter>,
}

/// Listing entry for a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    /// Lookup key
    pub key: String,
    /// Display name
    pub name: String,
    /// Number of parameters
    pub parameter_count: usize,
}

impl AlgorithmTemplate {
    /// Seeds a new algorithm definition from the template.
    ///
    /// The parameters are copied, the action is `validate` and no global
    /// parameters are set. A blank name falls back to the template name.
    pub fn instantiate(&self, name: &str, description: &str) -> AlgorithmDefinition {
        let name = if name.trim().is_empty() {
            self.name.to_string()
        } else {
            name.trim().to_string()
        };
        AlgorithmDefinition {
            name,
            description: description.to_string(),
            parameters: self.parameters.clone(),
            action: FinalAction::Validate,
            global_parameters: Vec::new(),
        }
    }

    /// Replaces the parameters of an existing definition.
    pub fn apply_to(&self, definition: &mut AlgorithmDefinition) {
        definition.parameters = self.parameters.clone();
    }

    /// Listing entry.
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            key: self.key.to_string(),
            name: self.name.to_string(),
            parameter_count: self.parameters.len(),
        }
    }
}

fn result_range(min: f64, max: f64, unit: &str) -> ParameterConfig {
    ParameterConfig::range(Some(min), Some(max))
        .with_unit(unit)
        .required()
}

fn qc(value: &str) -> ParameterConfig {
    ParameterConfig::contains(value).required()
}

static TEMPLATES: LazyLock<Vec<AlgorithmTemplate>> = LazyLock::new(|| {
    vec![
        AlgorithmTemplate {
            key: "blood",
            name: "Blood Analysis (FNS)",
            parameters: vec![
                Parameter::new("globule_rouge", "Globule Rouge")
                    .with_sub("result", result_range(5.0, 15.0, "M/µL"))
                    .with_sub(
                        "result_type",
                        ParameterConfig::list(["normal", "supra", "infra"]).required(),
                    )
                    .with_sub("qc", qc("abnormal")),
                Parameter::new("hemoglobine", "Hémoglobine")
                    .with_sub("result", result_range(12.0, 16.0, "g/dL"))
                    .with_sub("qc", qc("normal")),
                Parameter::new("plaquettes", "Plaquettes")
                    .with_sub("result", result_range(150.0, 450.0, "K/µL")),
            ],
        },
        AlgorithmTemplate {
            key: "urine",
            name: "Urine Analysis",
            parameters: vec![
                Parameter::new("proteine", "Protéine")
                    .with_sub("result", result_range(0.0, 0.15, "g/L"))
                    .with_sub("sample_type", ParameterConfig::list(["urine"]).required()),
                Parameter::new("glucose", "Glucose")
                    .with_sub("result", ParameterConfig::exact("0").required())
                    .with_sub("qc", qc("normal")),
            ],
        },
        AlgorithmTemplate {
            key: "biochemistry",
            name: "Biochemistry Analysis",
            parameters: vec![
                Parameter::new("cholesterol", "Cholestérol Total")
                    .with_sub("result", result_range(0.0, 2.0, "g/L"))
                    .with_sub(
                        "result_type",
                        ParameterConfig::list(["normal", "elevated", "low"]).required(),
                    ),
                Parameter::new("glucose_sanguin", "Glucose Sanguin")
                    .with_sub("result", result_range(0.7, 1.1, "g/L"))
                    .with_sub(
                        "unity",
                        ParameterConfig::list(["g/L", "mg/dL", "mmol/L"]).required(),
                    ),
            ],
        },
        AlgorithmTemplate {
            key: "hematology",
            name: "Hematology Analysis",
            parameters: vec![
                Parameter::new("leucocytes", "Leucocytes")
                    .with_sub("result", result_range(4.0, 10.0, "10^9/L"))
                    .with_sub(
                        "sample_type",
                        ParameterConfig::list(["blood", "plasma"]).required(),
                    ),
                Parameter::new("neutrophiles", "Neutrophiles")
                    .with_sub("result", result_range(50.0, 70.0, "%"))
                    .with_sub("qc", qc("normal")),
            ],
        },
    ]
});

/// All templates, in display order.
pub fn templates() -> &'static [AlgorithmTemplate] {
    &TEMPLATES
}

/// Looks up a template by key.
///
/// # Errors
///
/// Returns [`Error::TemplateNotFound`] for unknown keys.
pub fn template(key: &str) -> Result<&'static AlgorithmTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.key == key)
        .ok_or_else(|| Error::TemplateNotFound {
            key: key.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ValidationType;

    #[test]
    fn test_template_keys() {
        let keys: Vec<_> = templates().iter().map(|t| t.key).collect();
        assert_eq!(keys, ["blood", "urine", "biochemistry", "hematology"]);
    }

    #[test]
    fn test_unknown_template() {
        let err = template("saliva").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { key } if key == "saliva"));
    }

    #[test]
    fn test_blood_template_values() {
        let blood = template("blood").unwrap();
        assert_eq!(blood.name, "Blood Analysis (FNS)");
        let globule = &blood.parameters[0];
        assert_eq!(globule.name, "globule_rouge");
        assert_eq!(globule.sub_parameters.len(), 3);
        let result = globule.sub_parameters[0].config.as_ref().unwrap();
        assert_eq!(result.kind, ValidationType::Range);
        assert_eq!((result.min, result.max), (Some(5.0), Some(15.0)));
        assert_eq!(result.unit.as_deref(), Some("M/µL"));
        let qc = globule.sub_parameters[2].config.as_ref().unwrap();
        assert_eq!(qc.value.as_ref().unwrap().as_text(), "abnormal");
    }

    #[test]
    fn test_urine_glucose_is_exact_text_zero() {
        let urine = template("urine").unwrap();
        let config = urine.parameters[1].sub_parameters[0].config.as_ref().unwrap();
        assert_eq!(config.kind, ValidationType::Exact);
        assert_eq!(config.value, Some("0".into()));
    }

    #[test]
    fn test_all_templates_validate() {
        for t in templates() {
            assert!(t.instantiate("", "").validate().is_ok(), "{} is invalid", t.key);
        }
    }

    #[test]
    fn test_instantiate() {
        let hematology = template("hematology").unwrap();
        let definition = hematology.instantiate("  Night shift  ", "CBC");
        assert_eq!(definition.name, "Night shift");
        assert_eq!(definition.description, "CBC");
        assert_eq!(definition.action, FinalAction::Validate);
        assert!(definition.global_parameters.is_empty());
        assert_eq!(definition.parameters, hematology.parameters);

        let fallback = hematology.instantiate(" ", "");
        assert_eq!(fallback.name, "Hematology Analysis");
    }

    #[test]
    fn test_apply_to_keeps_other_fields() {
        let mut definition = AlgorithmDefinition::new("Mine");
        definition.action = FinalAction::Expert;
        template("urine").unwrap().apply_to(&mut definition);
        assert_eq!(definition.name, "Mine");
        assert_eq!(definition.action, FinalAction::Expert);
        assert_eq!(definition.parameters.len(), 2);
    }

    #[test]
    fn test_summary() {
        let summary = template("biochemistry").unwrap().summary();
        assert_eq!(summary.name, "Biochemistry Analysis");
        assert_eq!(summary.parameter_count, 2);
    }
}
