//! Integration tests for single-algorithm executions.

use labval_core::{EvaluationContext, Outcome, Verdict};
use labval_workflows::{
    ExecutionRequest, ExecutionState, ExecutionTarget, LogLevel, STEPS,
};

use crate::common::{TestHarness, WAIT, anemic_patient, healthy_patient, today};

#[tokio::test]
async fn test_healthy_patient_is_validated() {
    let harness = TestHarness::new().await;
    let target = ExecutionTarget::Algorithm(harness.blood.id);
    let handle = harness
        .registry
        .submit(ExecutionRequest::new(target, healthy_patient()).on(today()))
        .await
        .expect("target should resolve");

    let status = handle.wait_finished(WAIT).await.expect("execution should finish");
    assert_eq!(status.state, ExecutionState::Completed);
    assert_eq!(status.status, "Execution Complete: VALIDATED");

    let report = status.report.expect("completed execution has a report");
    assert_eq!(report.outcome, Outcome::Validated);
    assert_eq!(report.patient_id, "P-100");
    assert_eq!(report.algorithms.len(), 1);
    assert_eq!(
        report.algorithms[0].checks.len(),
        harness.blood.definition.sub_parameter_count()
    );
    assert!(report.algorithms[0].checks.iter().all(|c| c.passed()));
}

#[tokio::test]
async fn test_out_of_range_value_requires_expert() {
    let harness = TestHarness::new().await;
    let target = ExecutionTarget::Algorithm(harness.blood.id);
    let handle = harness
        .registry
        .submit(ExecutionRequest::new(target, anemic_patient()).on(today()))
        .await
        .unwrap();

    let status = handle.wait_finished(WAIT).await.unwrap();
    let report = status.report.unwrap();
    assert_eq!(report.outcome, Outcome::ExpertRequired);

    let failed: Vec<_> = report.algorithms[0]
        .checks
        .iter()
        .filter(|c| c.is_failure())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].parameter, "hemoglobine");
    assert_eq!(failed[0].verdict, Verdict::fail("9.1 below minimum 12"));

    let warnings: Vec<_> = status
        .logs
        .iter()
        .filter(|l| l.level == LogLevel::Warning)
        .map(|l| l.message.as_str())
        .collect();
    assert_eq!(
        warnings,
        [
            "Result: EXPERT_REQUIRED",
            "Some parameters require expert review",
            "Flagged for manual validation"
        ]
    );
}

#[tokio::test]
async fn test_missing_required_value() {
    let harness = TestHarness::new().await;
    let mut patient = healthy_patient();
    patient.results.remove("plaquettes");

    let report = harness.registry.executor().evaluate_algorithm(
        &harness.blood,
        &patient,
        &EvaluationContext::at(today()),
    );
    assert_eq!(report.outcome, Outcome::ExpertRequired);
    let missing: Vec<_> = report
        .checks
        .iter()
        .filter(|c| c.verdict == Verdict::Missing)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].parameter, "plaquettes");
    assert_eq!(missing[0].sub_parameter, "result");
}

#[tokio::test]
async fn test_step_log_order() {
    let harness = TestHarness::new().await;
    let target = ExecutionTarget::Algorithm(harness.blood.id);
    let handle = harness
        .registry
        .submit(ExecutionRequest::new(target, healthy_patient()).on(today()))
        .await
        .unwrap();
    let status = handle.wait_finished(WAIT).await.unwrap();

    let positions: Vec<usize> = STEPS
        .iter()
        .map(|step| {
            status
                .logs
                .iter()
                .position(|l| l.message == *step)
                .expect("every step is logged")
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let checking = status
        .logs
        .iter()
        .position(|l| l.message == "Checking Globule Rouge:")
        .unwrap();
    assert!(checking > positions[3] && checking < positions[4]);
}

#[tokio::test]
async fn test_simulated_execution_is_reproducible() {
    let harness = TestHarness::new().await;
    let target = ExecutionTarget::Algorithm(harness.blood.id);

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let handle = harness
            .registry
            .submit(ExecutionRequest::new(target, healthy_patient()).simulated(Some(1234)))
            .await
            .unwrap();
        let report = handle.wait_finished(WAIT).await.unwrap().report.unwrap();
        outcomes.push((report.outcome, report.algorithms[0].checks.clone()));
    }
    assert_eq!(outcomes[0], outcomes[1]);
}

#[tokio::test]
async fn test_execution_listed_by_registry() {
    let harness = TestHarness::new().await;
    let target = ExecutionTarget::Algorithm(harness.blood.id);
    let handle = harness
        .registry
        .submit(ExecutionRequest::new(target, healthy_patient()))
        .await
        .unwrap();
    handle.wait_finished(WAIT).await.unwrap();

    let listed = harness.registry.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].execution_id, handle.id());
    assert_eq!(listed[0].target, target);
}
