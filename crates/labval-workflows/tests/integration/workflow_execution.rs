//! Integration tests for workflow executions.

use labval_core::Outcome;
use labval_workflows::{
    Error, ExecutionConfig, ExecutionRequest, ExecutionState, ExecutionTarget, STEPS,
};
use std::time::Duration;

use crate::common::{TestHarness, WAIT, anemic_patient, child_patient, healthy_patient, today};

#[tokio::test]
async fn test_workflow_runs_algorithms_in_order() {
    let harness = TestHarness::new().await;
    let target = ExecutionTarget::Workflow(harness.workflow.id);
    let handle = harness
        .registry
        .submit(ExecutionRequest::new(target, healthy_patient()).on(today()))
        .await
        .unwrap();

    let status = handle.wait_finished(WAIT).await.unwrap();
    let report = status.report.unwrap();
    assert_eq!(report.outcome, Outcome::Validated);

    let ids: Vec<_> = report.algorithms.iter().map(|a| a.algorithm_id).collect();
    assert_eq!(ids, [harness.blood.id, harness.urine.id]);

    let step_count = status.logs.iter().filter(|l| STEPS.contains(&l.message.as_str())).count();
    assert_eq!(step_count, STEPS.len() * 2);
    assert!(status.logs.iter().any(|l| l.message == "Workflow: Morning run"));
    assert!(status.logs.iter().any(|l| l.message == "Workflow Result: VALIDATED"));
}

#[tokio::test]
async fn test_one_failing_algorithm_requires_expert() {
    let harness = TestHarness::new().await;
    let target = ExecutionTarget::Workflow(harness.workflow.id);
    let handle = harness
        .registry
        .submit(ExecutionRequest::new(target, anemic_patient()).on(today()))
        .await
        .unwrap();

    let report = handle.wait_finished(WAIT).await.unwrap().report.unwrap();
    assert_eq!(report.algorithms[0].outcome, Outcome::ExpertRequired);
    assert_eq!(report.algorithms[1].outcome, Outcome::Validated);
    assert_eq!(report.outcome, Outcome::ExpertRequired);
}

#[tokio::test]
async fn test_not_applicable_algorithm_is_skipped() {
    let harness = TestHarness::new().await;
    let target = ExecutionTarget::Workflow(harness.workflow.id);
    let handle = harness
        .registry
        .submit(ExecutionRequest::new(target, child_patient()).on(today()))
        .await
        .unwrap();

    let status = handle.wait_finished(WAIT).await.unwrap();
    let report = status.report.unwrap();
    let urine = &report.algorithms[1];
    assert_eq!(urine.outcome, Outcome::NotApplicable);
    assert!(urine.checks.is_empty());
    assert!(urine.reason.is_some());
    assert_eq!(report.outcome, Outcome::Validated);
    assert!(status.logs.iter().any(|l| l.message == "Result: NOT_APPLICABLE"));
}

#[tokio::test]
async fn test_deleted_algorithm_fails_execution() {
    let harness = TestHarness::new().await;
    harness.store.delete_algorithm(&harness.urine.id).await.unwrap();

    let target = ExecutionTarget::Workflow(harness.workflow.id);
    let err = harness
        .registry
        .submit(ExecutionRequest::new(target, healthy_patient()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let handle = harness
        .registry
        .spawn(ExecutionRequest::new(target, healthy_patient()));
    let err = handle.wait_finished(WAIT).await.unwrap_err();
    let Error::ExecutionFailed { reason, .. } = err else {
        unreachable!("Expected ExecutionFailed error variant");
    };
    assert_eq!(reason, format!("Algorithm not found: {}", harness.urine.id));
    assert_eq!(handle.status().state, ExecutionState::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_observable_while_running() {
    let config = ExecutionConfig::default().with_step_delay(Duration::from_millis(100));
    let harness = TestHarness::with_config(config).await;
    let target = ExecutionTarget::Workflow(harness.workflow.id);
    let handle = harness
        .registry
        .submit(ExecutionRequest::new(target, healthy_patient()).on(today()))
        .await
        .unwrap();

    let mut rx = handle.subscribe();
    let mut seen = Vec::new();
    while !rx.borrow().state.is_finished() {
        rx.changed().await.unwrap();
        seen.push(rx.borrow_and_update().progress);
    }

    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().any(|p| *p > 0.0 && *p < 100.0));
    assert_eq!(seen.last().copied(), Some(100.0));
}
