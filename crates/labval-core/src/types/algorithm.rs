//! Algorithms: named sets of parameter validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::ParameterConfig;
use super::ids::DocumentId;
use super::outcome::{CheckResult, Outcome};
use crate::error::{Error, Result};

/// A checked aspect of a parameter (`result`, `qc`, `unity`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubParameter {
    /// Sub-parameter name
    pub param: String,

    /// Rule; a sub-parameter without one is listed but never checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ParameterConfig>,
}

impl SubParameter {
    /// Creates a sub-parameter with a rule.
    pub fn new(param: impl Into<String>, config: ParameterConfig) -> Self {
        Self {
            param: param.into(),
            config: Some(config),
        }
    }
}

/// A lab test within an algorithm (e.g. `hemoglobine`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name, the key used in patient records
    pub name: String,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Checked aspects
    #[serde(default)]
    pub sub_parameters: Vec<SubParameter>,
}

impl Parameter {
    /// Creates a parameter without sub-parameters.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            sub_parameters: Vec::new(),
        }
    }

    /// Adds a sub-parameter.
    pub fn with_sub(mut self, param: impl Into<String>, config: ParameterConfig) -> Self {
        self.sub_parameters.push(SubParameter::new(param, config));
        self
    }

    /// Label to show, falling back to the name when the label is blank.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// What happens once all checks of an algorithm have run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalAction {
    /// Validate automatically when every check passes.
    #[default]
    Validate,
    /// Always hand over to an expert.
    Expert,
    /// Validate when every required check passes.
    Conditional,
}

impl FinalAction {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FinalAction::Validate => "Auto Validate",
            FinalAction::Expert => "Call Expert",
            FinalAction::Conditional => "Conditional",
        }
    }

    /// Decides the outcome of an algorithm from its checks.
    ///
    /// # Examples
    ///
    /// ```
    /// use labval_core::{FinalAction, Outcome};
    ///
    /// assert_eq!(FinalAction::Validate.resolve(&[]), Outcome::Validated);
    /// assert_eq!(FinalAction::Expert.resolve(&[]), Outcome::ExpertRequired);
    /// ```
    pub fn resolve(&self, checks: &[CheckResult]) -> Outcome {
        let validated = match self {
            FinalAction::Validate => !checks.iter().any(CheckResult::is_failure),
            FinalAction::Expert => false,
            FinalAction::Conditional => !checks.iter().any(|c| c.required && c.is_failure()),
        };
        if validated {
            Outcome::Validated
        } else {
            Outcome::ExpertRequired
        }
    }
}

impl fmt::Display for FinalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FinalAction::Validate => "validate",
            FinalAction::Expert => "expert",
            FinalAction::Conditional => "conditional",
        };
        f.write_str(s)
    }
}

/// Value of a global (patient-level) parameter attached to an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalParameterValue {
    /// Global parameter name (`patient_gender`, `patient_age_min`, ...)
    pub name: String,
    /// Arbitrary JSON value
    #[serde(default)]
    pub value: serde_json::Value,
}

impl GlobalParameterValue {
    /// Creates a global parameter value.
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Value rendered for logs, strings without quotes.
    pub fn display_value(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// The user-editable body of an algorithm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmDefinition {
    /// Algorithm name
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Parameters, in evaluation order
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Final action
    #[serde(default)]
    pub action: FinalAction,

    /// Patient-level parameters
    #[serde(default)]
    pub global_parameters: Vec<GlobalParameterValue>,
}

impl AlgorithmDefinition {
    /// Creates an empty definition with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the definition as it is stored.
    ///
    /// Trims the name, then drops parameters with a blank name and
    /// sub-parameters with a blank `param`. Parameters left without
    /// sub-parameters are kept.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.parameters.retain(|p| !p.name.trim().is_empty());
        for parameter in &mut self.parameters {
            parameter
                .sub_parameters
                .retain(|sub| !sub.param.trim().is_empty());
        }
        self
    }

    /// Checks the definition before it is stored.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation_field(
                "name",
                "Please enter an algorithm name",
            ));
        }
        for (i, parameter) in self.parameters.iter().enumerate() {
            for (j, sub) in parameter.sub_parameters.iter().enumerate() {
                if let Some(config) = &sub.config {
                    config
                        .rule()
                        .map_err(|e| e.within(&format!("parameters[{i}].subParameters[{j}]")))?;
                }
            }
        }
        Ok(())
    }

    /// Total number of sub-parameters.
    pub fn sub_parameter_count(&self) -> usize {
        self.parameters.iter().map(|p| p.sub_parameters.len()).sum()
    }

    /// Looks up a global parameter value by name.
    pub fn global(&self, name: &str) -> Option<&serde_json::Value> {
        self.global_parameters
            .iter()
            .find(|g| g.name == name)
            .map(|g| &g.value)
    }

    /// Copies the definition under a new name.
    ///
    /// Without a name the copy is called `"<name> (Copy)"`.
    pub fn duplicate(&self, name: Option<&str>) -> Result<Self> {
        let name = match name {
            Some(name) if name.trim().is_empty() => {
                return Err(Error::validation_field(
                    "name",
                    "Please enter an algorithm name",
                ));
            }
            Some(name) => name.trim().to_string(),
            None => format!("{} (Copy)", self.name),
        };
        Ok(Self {
            name,
            ..self.clone()
        })
    }
}

/// A stored algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Algorithm {
    /// Document id
    pub id: DocumentId,

    /// Editable body
    #[serde(flatten)]
    pub definition: AlgorithmDefinition,

    /// Creation time
    pub created: DateTime<Utc>,

    /// Last update time
    pub last_modified: DateTime<Utc>,
}

impl Algorithm {
    /// Wraps a definition into a new document.
    pub fn new(definition: AlgorithmDefinition) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::with_timestamp(now),
            definition,
            created: now,
            last_modified: now,
        }
    }

    /// Algorithm name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}
