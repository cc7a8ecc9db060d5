//! Property-based tests for outcome aggregation and simulation.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::ExecutionConfig;
    use crate::handle::ExecutionHandle;
    use crate::ids::ExecutionId;
    use crate::simulate::Simulator;
    use crate::types::{ExecutionTarget, aggregate_outcome};
    use labval_core::catalog::template;
    use labval_core::{DocumentId, Outcome};
    use proptest::prelude::*;

    fn outcome() -> impl Strategy<Value = Outcome> {
        prop_oneof![
            Just(Outcome::Validated),
            Just(Outcome::ExpertRequired),
            Just(Outcome::NotApplicable),
        ]
    }

    proptest! {
        #[test]
        fn test_aggregate_ignores_order(
            outcomes in prop::collection::vec(outcome(), 0..12),
            shift in 0usize..12,
        ) {
            let expected = aggregate_outcome(outcomes.clone());

            let mut reversed = outcomes.clone();
            reversed.reverse();
            prop_assert_eq!(aggregate_outcome(reversed), expected);

            let mut rotated = outcomes.clone();
            if !rotated.is_empty() {
                let len = rotated.len();
                rotated.rotate_left(shift % len);
            }
            prop_assert_eq!(aggregate_outcome(rotated), expected);
        }

        #[test]
        fn test_aggregate_matches_members(outcomes in prop::collection::vec(outcome(), 0..12)) {
            let expected = if outcomes.contains(&Outcome::ExpertRequired) {
                Outcome::ExpertRequired
            } else if outcomes.contains(&Outcome::Validated) {
                Outcome::Validated
            } else {
                Outcome::NotApplicable
            };
            prop_assert_eq!(aggregate_outcome(outcomes), expected);
        }

        #[test]
        fn test_probability_validation(pass in any::<f64>(), validated in any::<f64>()) {
            let config = ExecutionConfig {
                pass_probability: pass,
                validated_probability: validated,
                ..ExecutionConfig::default()
            };
            let in_range = |p: f64| (0.0..=1.0).contains(&p);
            prop_assert_eq!(config.validate().is_ok(), in_range(pass) && in_range(validated));
            prop_assert_eq!(Simulator::new(None, &config).is_ok(), config.validate().is_ok());
        }

        #[test]
        fn test_simulation_is_seeded(
            seed in any::<u64>(),
            pass in 0.0f64..=1.0,
            validated in 0.0f64..=1.0,
        ) {
            let config = ExecutionConfig {
                pass_probability: pass,
                validated_probability: validated,
                ..ExecutionConfig::default()
            };
            let definition = template("urine").unwrap().instantiate("Urine", "");
            let mut a = Simulator::new(Some(seed), &config).unwrap();
            let mut b = Simulator::new(Some(seed), &config).unwrap();
            let checks = a.checks(&definition);
            prop_assert_eq!(checks.len(), definition.sub_parameter_count());
            prop_assert_eq!(&checks, &b.checks(&definition));
            prop_assert_eq!(a.outcome(), b.outcome());
        }

        #[test]
        fn test_progress_stays_in_bounds(steps in prop::collection::vec(-500.0f64..500.0, 1..20)) {
            let handle = ExecutionHandle::new(
                ExecutionId::new(),
                ExecutionTarget::Algorithm(DocumentId::new()),
            );
            for progress in steps {
                handle.set_progress(progress);
                let current = handle.status().progress;
                prop_assert!((0.0..=100.0).contains(&current));
            }
        }
    }
}
