//! Common test utilities and harness for labval-workflows integration tests.

use chrono::NaiveDate;
use labval_core::catalog::template;
use labval_core::{Algorithm, GlobalParameterValue, PatientRecord, Workflow, WorkflowDefinition};
use labval_store::Store;
use labval_workflows::{ExecutionConfig, ExecutionRegistry, Executor};
use std::time::Duration;

/// How long tests wait for an execution.
pub const WAIT: Duration = Duration::from_secs(10);

/// Test harness for integration tests.
///
/// Holds an in-memory store seeded with algorithms instantiated from the
/// blood and urine templates plus a workflow chaining them.
pub struct TestHarness {
    /// Shared store
    pub store: Store,
    /// Registry running executions against `store`
    pub registry: ExecutionRegistry,
    /// Algorithm from the blood template
    pub blood: Algorithm,
    /// Adults-only algorithm from the urine template
    pub urine: Algorithm,
    /// Blood then urine
    pub workflow: Workflow,
}

impl TestHarness {
    /// Creates a harness with default engine settings.
    pub async fn new() -> Self {
        Self::with_config(ExecutionConfig::default()).await
    }

    /// Creates a harness with custom engine settings.
    pub async fn with_config(config: ExecutionConfig) -> Self {
        let store = Store::in_memory();

        let blood = store
            .create_algorithm(template("blood").unwrap().instantiate("Blood count", ""))
            .await
            .expect("blood algorithm should be stored");

        let mut urine_def = template("urine").unwrap().instantiate("Urine panel", "");
        urine_def.global_parameters = vec![GlobalParameterValue::new("patient_age_min", 18)];
        let urine = store
            .create_algorithm(urine_def)
            .await
            .expect("urine algorithm should be stored");

        let workflow = store
            .create_workflow(WorkflowDefinition::new(
                "Morning run",
                vec![blood.id, urine.id],
            ))
            .await
            .expect("workflow should be stored");

        let registry = ExecutionRegistry::new(Executor::new(store.clone(), config));
        Self {
            store,
            registry,
            blood,
            urine,
            workflow,
        }
    }
}

/// Reference date used by every request.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// Adult patient whose results satisfy every blood and urine rule.
pub fn healthy_patient() -> PatientRecord {
    PatientRecord::new("P-100")
        .with_age(42.0)
        .with_gender("F")
        .with_result("globule_rouge", "result", 9.9)
        .with_result("globule_rouge", "result_type", "normal")
        .with_result("globule_rouge", "qc", "abnormal flag cleared")
        .with_result("hemoglobine", "result", 13.2)
        .with_result("hemoglobine", "qc", "normal")
        .with_result("plaquettes", "result", 250.0)
        .with_result("proteine", "result", 0.1)
        .with_result("proteine", "sample_type", "urine")
        .with_result("glucose", "result", "0")
        .with_result("glucose", "qc", "Normal")
}

/// The same patient with a hemoglobin value below range.
pub fn anemic_patient() -> PatientRecord {
    healthy_patient().with_result("hemoglobine", "result", 9.1)
}

/// A child: the adults-only urine algorithm does not apply.
pub fn child_patient() -> PatientRecord {
    let mut patient = healthy_patient();
    patient.patient_id = "P-7".to_string();
    patient.age = Some(7.0);
    patient
}
