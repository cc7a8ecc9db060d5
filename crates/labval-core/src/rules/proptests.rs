//! Property-based tests for the rule interpreter.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::rules::{EvaluationContext, Observation, Verdict, evaluate};
    use crate::types::ParameterConfig;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_widening_range_keeps_pass(
            lo in -1000.0f64..1000.0,
            span in 0.0f64..500.0,
            widen in 0.0f64..100.0,
            value in -2000.0f64..2000.0,
        ) {
            let ctx = EvaluationContext::default();
            let obs = Observation::new(value);
            let narrow = ParameterConfig::range(Some(lo), Some(lo + span));
            let wide = ParameterConfig::range(Some(lo - widen), Some(lo + span + widen));
            if evaluate(&narrow, Some(&obs), &ctx) == Verdict::Pass {
                prop_assert_eq!(evaluate(&wide, Some(&obs), &ctx), Verdict::Pass);
            }
        }

        #[test]
        fn test_range_verdict_matches_bounds(
            lo in -100.0f64..100.0,
            span in 0.0f64..100.0,
            value in -300.0f64..300.0,
        ) {
            let ctx = EvaluationContext::default();
            let config = ParameterConfig::range(Some(lo), Some(lo + span));
            let verdict = evaluate(&config, Some(&Observation::new(value)), &ctx);
            let inside = value >= lo && value <= lo + span;
            prop_assert_eq!(verdict == Verdict::Pass, inside);
        }

        #[test]
        fn test_list_accepts_any_case_of_option(option in "[a-zA-Z]{1,12}") {
            let ctx = EvaluationContext::default();
            let config = ParameterConfig::list([option.to_lowercase()]);
            let obs = Observation::new(option.to_uppercase().as_str());
            prop_assert_eq!(evaluate(&config, Some(&obs), &ctx), Verdict::Pass);
        }
    }
}
