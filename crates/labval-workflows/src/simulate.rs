//! Simulated check results.
//!
//! Simulation mode ignores the patient's observations: each check passes
//! with a fixed probability and the final result is drawn on its own.

use labval_core::{AlgorithmDefinition, CheckResult, Outcome, Verdict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ExecutionConfig;
use crate::error::Result;

/// Reason attached to simulated failures.
pub const SIMULATED_FAILURE: &str = "simulated failure";

/// Random source for simulated executions.
#[derive(Debug)]
pub struct Simulator {
    rng: StdRng,
    pass_probability: f64,
    validated_probability: f64,
}

impl Simulator {
    /// Creates a simulator; a seed makes runs reproducible.
    ///
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) when a probability is not
    /// within `0..=1`.
    pub fn new(seed: Option<u64>, config: &ExecutionConfig) -> Result<Self> {
        config.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Ok(Self {
            rng,
            pass_probability: config.pass_probability,
            validated_probability: config.validated_probability,
        })
    }

    /// Draws a verdict for every sub-parameter of the algorithm.
    pub fn checks(&mut self, definition: &AlgorithmDefinition) -> Vec<CheckResult> {
        let mut checks = Vec::with_capacity(definition.sub_parameter_count());
        for parameter in &definition.parameters {
            for sub in &parameter.sub_parameters {
                let verdict = if self.rng.random_bool(self.pass_probability) {
                    Verdict::Pass
                } else {
                    Verdict::fail(SIMULATED_FAILURE)
                };
                let (rule, required) = match &sub.config {
                    Some(config) => (config.summary(), config.required),
                    None => ("none".to_string(), false),
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

    /// Draws the final result of an algorithm.
    pub fn outcome(&mut self) -> Outcome {
        if self.rng.random_bool(self.validated_probability) {
            Outcome::Validated
        } else {
            Outcome::ExpertRequired
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use labval_core::catalog::template;

    fn definition() -> AlgorithmDefinition {
        template("blood").unwrap().instantiate("Blood", "")
    }

    #[test]
    fn test_one_check_per_sub_parameter() {
        let def = definition();
        let mut sim = Simulator::new(Some(1), &ExecutionConfig::default()).unwrap();
        let checks = sim.checks(&def);
        assert_eq!(checks.len(), def.sub_parameter_count());
        assert!(checks.iter().all(|c| matches!(
            c.verdict,
            Verdict::Pass | Verdict::Fail { .. }
        )));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let def = definition();
        let config = ExecutionConfig::default();
        let mut a = Simulator::new(Some(42), &config).unwrap();
        let mut b = Simulator::new(Some(42), &config).unwrap();
        assert_eq!(a.checks(&def), b.checks(&def));
        assert_eq!(a.outcome(), b.outcome());
    }

    #[test]
    fn test_certain_probabilities() {
        let def = definition();
        let config = ExecutionConfig {
            pass_probability: 1.0,
            validated_probability: 0.0,
            ..ExecutionConfig::default()
        };
        let mut sim = Simulator::new(None, &config).unwrap();
        assert!(sim.checks(&def).iter().all(CheckResult::passed));
        assert_eq!(sim.outcome(), Outcome::ExpertRequired);
    }

    #[test]
    fn test_invalid_probabilities_rejected() {
        for (pass, validated) in [(f64::NAN, 0.3), (0.8, f64::INFINITY), (3.0, 0.3), (0.8, -1.0)] {
            let config = ExecutionConfig {
                pass_probability: pass,
                validated_probability: validated,
                ..ExecutionConfig::default()
            };
            let err = Simulator::new(Some(3), &config).unwrap_err();
            assert!(matches!(err, crate::Error::Config { .. }));
        }
    }
}
