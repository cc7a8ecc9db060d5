//! Patient records and algorithm applicability.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rules::Observation;
use crate::types::AlgorithmDefinition;

/// Lab results of one patient.
///
/// `results` maps a parameter name to its sub-parameter observations:
///
/// ```json
/// {
///   "patientId": "P-001",
///   "age": 42,
///   "gender": "F",
///   "results": { "hemoglobine": { "result": { "value": 13.2, "unit": "g/dL" }, "qc": "normal" } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Patient identifier
    pub patient_id: String,

    /// Age in years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,

    /// Gender (`M`, `F`, `Male`, `Female`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// Questionnaire answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questionnaire: Option<String>,

    /// Observations by parameter, then sub-parameter
    #[serde(default)]
    pub results: BTreeMap<String, BTreeMap<String, Observation>>,
}

impl PatientRecord {
    /// Creates an empty record.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Self::default()
        }
    }

    /// Sets the age.
    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the gender.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Adds an observation.
    pub fn with_result(
        mut self,
        parameter: impl Into<String>,
        sub_parameter: impl Into<String>,
        observation: impl Into<Observation>,
    ) -> Self {
        self.results
            .entry(parameter.into())
            .or_default()
            .insert(sub_parameter.into(), observation.into());
        self
    }

    /// Looks up an observation.
    pub fn observation(&self, parameter: &str, sub_parameter: &str) -> Option<&Observation> {
        self.results.get(parameter)?.get(sub_parameter)
    }

    /// Decides whether an algorithm applies to this patient.
    ///
    /// The algorithm's `patient_age_min` / `patient_age_max` global
    /// parameters bound the age and a non-blank `patient_gender` must
    /// match. A filter is ignored when the patient lacks the attribute.
    pub fn applicability(&self, definition: &AlgorithmDefinition) -> Applicability {
        if let Some(age) = self.age {
            if let Some(min) = definition.global("patient_age_min").and_then(json_number)
                && age < min
            {
                return Applicability::not_applicable(format!(
                    "patient age {age} below minimum {min}"
                ));
            }
            if let Some(max) = definition.global("patient_age_max").and_then(json_number)
                && age > max
            {
                return Applicability::not_applicable(format!(
                    "patient age {age} above maximum {max}"
                ));
            }
        }

        if let Some(gender) = self.gender.as_deref().filter(|g| !g.trim().is_empty())
            && let Some(wanted) = definition
                .global("patient_gender")
                .and_then(serde_json::Value::as_str)
                .filter(|g| !g.trim().is_empty())
            && canonical_gender(gender) != canonical_gender(wanted)
        {
            return Applicability::not_applicable(format!(
                "patient gender {gender} does not match {wanted}"
            ));
        }

        Applicability::Applicable
    }
}

/// Whether an algorithm applies to a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Applicability {
    /// Every filter matched.
    Applicable,
    /// A filter excluded the patient.
    NotApplicable {
        /// Which filter excluded the patient
        reason: String,
    },
}

impl Applicability {
    fn not_applicable(reason: String) -> Self {
        Applicability::NotApplicable { reason }
    }

    /// Returns `true` for [`Applicability::Applicable`].
    pub fn is_applicable(&self) -> bool {
        matches!(self, Applicability::Applicable)
    }
}

fn json_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn canonical_gender(value: &str) -> String {
    let value = value.trim().to_lowercase();
    match value.as_str() {
        "m" | "male" => "m".to_string(),
        "f" | "female" => "f".to_string(),
        _ => value,
    }
}
