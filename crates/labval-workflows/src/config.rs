//! Execution configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Tuning of the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Pause between execution steps, in milliseconds.
    #[serde(default)]
    pub step_delay_ms: u64,

    /// Number of executions kept for polling.
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,

    /// Probability that a simulated check passes.
    #[serde(default = "default_pass_probability")]
    pub pass_probability: f64,

    /// Probability that a simulated run ends `VALIDATED`.
    #[serde(default = "default_validated_probability")]
    pub validated_probability: f64,
}

fn default_max_retained() -> usize {
    100
}

fn default_pass_probability() -> f64 {
    0.8
}

fn default_validated_probability() -> f64 {
    0.3
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 0,
            max_retained: default_max_retained(),
            pass_probability: default_pass_probability(),
            validated_probability: default_validated_probability(),
        }
    }
}

impl ExecutionConfig {
    /// Pause between steps.
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Sets the pause between steps.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the number of retained executions.
    pub fn with_max_retained(mut self, max_retained: usize) -> Self {
        self.max_retained = max_retained;
        self
    }

    /// Checks that both simulation probabilities are within `0..=1`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("pass_probability", self.pass_probability),
            ("validated_probability", self.validated_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutionConfig::default();
        assert_eq!(config.step_delay(), Duration::ZERO);
        assert_eq!(config.max_retained, 100);
        assert_eq!(config.pass_probability, 0.8);
        assert_eq!(config.validated_probability, 0.3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ExecutionConfig = serde_json::from_str(r#"{"step_delay_ms": 1000}"#).unwrap();
        assert_eq!(config.step_delay(), Duration::from_secs(1));
        assert_eq!(config.max_retained, 100);
    }

    #[test]
    fn test_validate() {
        assert!(ExecutionConfig::default().validate().is_ok());

        let edges = ExecutionConfig {
            pass_probability: 0.0,
            validated_probability: 1.0,
            ..ExecutionConfig::default()
        };
        assert!(edges.validate().is_ok());

        let nan = ExecutionConfig {
            pass_probability: f64::NAN,
            ..ExecutionConfig::default()
        };
        let err = nan.validate().unwrap_err();
        assert!(err.to_string().contains("pass_probability"));

        let high = ExecutionConfig {
            validated_probability: 1.5,
            ..ExecutionConfig::default()
        };
        assert!(high.validate().unwrap_err().to_string().contains("validated_probability"));
    }

    #[test]
    fn test_builders() {
        let config = ExecutionConfig::default()
            .with_step_delay(Duration::from_millis(250))
            .with_max_retained(3);
        assert_eq!(config.step_delay_ms, 250);
        assert_eq!(config.max_retained, 3);
    }
}
