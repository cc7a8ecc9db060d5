//! Observed lab values.

use serde::{Deserialize, Serialize};

use crate::types::ConfigValue;

/// A measured value with an optional unit.
///
/// Deserializes from a bare scalar (`4.2`, `"normal"`, `true`) or from
/// `{"value": ..., "unit": "g/L"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ObservationRepr")]
pub struct Observation {
    /// Measured value
    pub value: ConfigValue,

    /// Unit the instrument reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObservationRepr {
    Detailed {
        value: ConfigValue,
        #[serde(default)]
        unit: Option<String>,
    },
    Bare(ConfigValue),
}

impl From<ObservationRepr> for Observation {
    fn from(repr: ObservationRepr) -> Self {
        match repr {
            ObservationRepr::Detailed { value, unit } => Self { value, unit },
            ObservationRepr::Bare(value) => Self { value, unit: None },
        }
    }
}

impl Observation {
    /// Creates an observation without a unit.
    pub fn new(value: impl Into<ConfigValue>) -> Self {
        Self {
            value: value.into(),
            unit: None,
        }
    }

    /// Sets the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl From<f64> for Observation {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Observation {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<bool> for Observation {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_scalars() {
        let obs: Observation = serde_json::from_value(json!(13.4)).unwrap();
        assert_eq!(obs, Observation::new(13.4));
        let obs: Observation = serde_json::from_value(json!("normal")).unwrap();
        assert_eq!(obs.value, ConfigValue::Text("normal".into()));
        let obs: Observation = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(obs.value, ConfigValue::Flag(false));
    }

    #[test]
    fn test_detailed_form() {
        let obs: Observation =
            serde_json::from_value(json!({"value": 0.9, "unit": "g/L"})).unwrap();
        assert_eq!(obs, Observation::new(0.9).with_unit("g/L"));
    }

    #[test]
    fn test_serializes_detailed() {
        let json = serde_json::to_value(Observation::new("abnormal")).unwrap();
        assert_eq!(json, json!({"value": "abnormal"}));
    }
}
