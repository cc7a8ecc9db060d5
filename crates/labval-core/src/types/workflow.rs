//! Workflows: ordered chains of algorithms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::DocumentId;
use crate::error::{Error, Result};

/// The user-editable body of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Workflow name
    pub name: String,

    /// Algorithms to run, in order
    #[serde(default)]
    pub algorithm_order: Vec<DocumentId>,
}

impl WorkflowDefinition {
    /// Creates a workflow definition.
    pub fn new(name: impl Into<String>, algorithm_order: Vec<DocumentId>) -> Self {
        Self {
            name: name.into(),
            algorithm_order,
        }
    }

    /// Returns the definition with a trimmed name.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }

    /// Checks the definition before it is stored.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation_field("name", "Please enter a workflow name"));
        }
        if self.algorithm_order.is_empty() {
            return Err(Error::validation_field(
                "algorithmOrder",
                "Please select at least one algorithm",
            ));
        }
        Ok(())
    }
}

/// A stored workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Document id
    pub id: DocumentId,

    /// Editable body
    #[serde(flatten)]
    pub definition: WorkflowDefinition,

    /// Creation time
    pub created: DateTime<Utc>,

    /// Last update time
    pub last_modified: DateTime<Utc>,
}

impl Workflow {
    /// Wraps a definition into a new document.
    pub fn new(definition: WorkflowDefinition) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::with_timestamp(now),
            definition,
            created: now,
            last_modified: now,
        }
    }

    /// Workflow name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_requires_name() {
        let definition = WorkflowDefinition::new("", vec![DocumentId::new()]);
        let err = definition.validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Please enter a workflow name");
    }

    #[test]
    fn test_validate_requires_algorithms() {
        let definition = WorkflowDefinition::new("Morning", Vec::new());
        let Error::Validation { field, message } = definition.validate().unwrap_err() else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field.as_deref(), Some("algorithmOrder"));
        assert_eq!(message, "Please select at least one algorithm");
    }

    #[test]
    fn test_normalized_trims() {
        let definition = WorkflowDefinition::new("  Morning  ", vec![DocumentId::new()]).normalized();
        assert_eq!(definition.name, "Morning");
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_rejects_numeric_algorithm_ids() {
        let result = serde_json::from_value::<WorkflowDefinition>(json!({
            "name": "Legacy",
            "algorithmOrder": [1712345678901u64]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_workflow_json_shape() {
        let first = DocumentId::new();
        let workflow = Workflow::new(WorkflowDefinition::new("Morning", vec![first]));
        let json = serde_json::to_value(&workflow).unwrap();
        assert_eq!(json["name"], "Morning");
        assert_eq!(json["algorithmOrder"], json!([first.to_string()]));
        assert!(json["created"].is_string());
        let back: Workflow = serde_json::from_value(json).unwrap();
        assert_eq!(back, workflow);
    }
}
