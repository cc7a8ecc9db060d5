//! Step-by-step execution of algorithms and workflows.
//!
//! Every algorithm goes through the same seven [`STEPS`]. Checks are run
//! during the fourth step; the handle receives a log line per check and
//! its progress advances after every step.

use chrono::Utc;
use labval_core::rules::check_algorithm;
use labval_core::{Algorithm, Applicability, EvaluationContext, Outcome, PatientRecord, Verdict};
use labval_store::Store;
use std::time::Duration;

use crate::config::ExecutionConfig;
use crate::error::Result;
use crate::handle::ExecutionHandle;
use crate::simulate::Simulator;
use crate::types::{
    AlgorithmReport, ExecutionMode, ExecutionReport, ExecutionRequest, ExecutionTarget, LogLevel,
    aggregate_outcome,
};

/// Steps every algorithm goes through, in order.
pub const STEPS: [&str; 7] = [
    "Initializing algorithm...",
    "Loading parameter configurations...",
    "Fetching data from source...",
    "Validating parameter conditions...",
    "Executing algorithm logic...",
    "Generating results...",
    "Finalizing execution...",
];

/// Index of the step during which checks run.
const CHECK_STEP: usize = 3;

/// The algorithms behind an [`ExecutionTarget`].
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Workflow name when the target is a workflow
    pub workflow: Option<String>,
    /// Algorithms in execution order
    pub algorithms: Vec<Algorithm>,
}

/// Runs execution requests against the store.
#[derive(Debug, Clone)]
pub struct Executor {
    store: Store,
    config: ExecutionConfig,
}

impl Executor {
    /// Creates an executor.
    pub fn new(store: Store, config: ExecutionConfig) -> Self {
        Self { store, config }
    }

    /// The store algorithms are read from.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Engine settings.
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Loads the algorithms of a target.
    ///
    /// # Errors
    ///
    /// Store errors, notably `AlgorithmNotFound` and `WorkflowNotFound`.
    pub async fn resolve(&self, target: &ExecutionTarget) -> Result<ResolvedTarget> {
        match target {
            ExecutionTarget::Algorithm(id) => Ok(ResolvedTarget {
                workflow: None,
                algorithms: vec![self.store.get_algorithm(id).await?],
            }),
            ExecutionTarget::Workflow(id) => {
                let resolved = self.store.resolve_workflow(id).await?;
                Ok(ResolvedTarget {
                    workflow: Some(resolved.workflow.definition.name),
                    algorithms: resolved.algorithms,
                })
            }
        }
    }

    /// Runs a request to completion, reporting through `handle`.
    ///
    /// The handle ends up completed with the report, or failed with the
    /// error that stopped the run.
    pub async fn run(
        &self,
        request: &ExecutionRequest,
        handle: &ExecutionHandle,
    ) -> Result<ExecutionReport> {
        handle.start();
        match self.execute(request, handle).await {
            Ok(report) => {
                handle.complete(report.clone());
                Ok(report)
            }
            Err(e) => {
                handle.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Evaluates one algorithm against a patient without steps or delays.
    pub fn evaluate_algorithm(
        &self,
        algorithm: &Algorithm,
        patient: &PatientRecord,
        ctx: &EvaluationContext,
    ) -> AlgorithmReport {
        assess(algorithm, patient, ctx, None)
    }

    async fn execute(
        &self,
        request: &ExecutionRequest,
        handle: &ExecutionHandle,
    ) -> Result<ExecutionReport> {
        let started_at = Utc::now();
        let target = self.resolve(&request.target).await?;
        let ctx = request.today.map(EvaluationContext::at).unwrap_or_default();
        let mut simulator = match request.mode {
            ExecutionMode::Simulate { seed } => Some(Simulator::new(seed, &self.config)?),
            ExecutionMode::Evaluate => None,
        };

        tracing::debug!(
            execution_id = %handle.id(),
            target = %request.target,
            algorithms = target.algorithms.len(),
            "Resolved execution target"
        );

        let total_steps = (STEPS.len() * target.algorithms.len()).max(1);
        let mut done = 0usize;

        handle.log(
            format!("Starting execution for Patient: {}", request.patient.patient_id),
            LogLevel::Info,
        );
        if let Some(name) = &target.workflow {
            handle.log(format!("Workflow: {name}"), LogLevel::Info);
        }

        let mut reports = Vec::with_capacity(target.algorithms.len());
        for algorithm in &target.algorithms {
            self.log_preamble(request, algorithm, handle);

            let report = assess(algorithm, &request.patient, &ctx, simulator.as_mut());
            for (index, step) in STEPS.iter().enumerate() {
                handle.step(step);
                if index == CHECK_STEP {
                    log_checks(algorithm, &report, &request.mode, handle);
                }
                done += 1;
                handle.set_progress(done as f64 / total_steps as f64 * 100.0);
                self.pause().await;
            }
            log_result(&report, handle);
            reports.push(report);
        }

        let outcome = aggregate_outcome(reports.iter().map(|r| r.outcome));
        if target.workflow.is_some() {
            let level = outcome_level(outcome);
            handle.log(format!("Workflow Result: {outcome}"), level);
        }

        Ok(ExecutionReport {
            execution_id: handle.id(),
            patient_id: request.patient.patient_id.clone(),
            target: request.target,
            mode: request.mode,
            outcome,
            algorithms: reports,
            started_at,
            completed_at: Utc::now(),
        })
    }

    fn log_preamble(
        &self,
        request: &ExecutionRequest,
        algorithm: &Algorithm,
        handle: &ExecutionHandle,
    ) {
        handle.log(format!("Algorithm: {}", algorithm.name()), LogLevel::Info);
        handle.log(
            format!("Analysis Type: {}", request.analysis_type),
            LogLevel::Info,
        );
        handle.log(format!("Data Source: {}", request.data_source), LogLevel::Info);
        let globals = &algorithm.definition.global_parameters;
        if !globals.is_empty() {
            handle.log("Global Parameters:", LogLevel::Info);
            for global in globals {
                handle.log(
                    format!("  └─ {}: {}", global.name, global.display_value()),
                    LogLevel::Info,
                );
            }
        }
        handle.log("---", LogLevel::Info);
    }

    async fn pause(&self) {
        let delay = self.config.step_delay();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
    }
}

// ============================================================================
// Assessment
// ============================================================================

fn assess(
    algorithm: &Algorithm,
    patient: &PatientRecord,
    ctx: &EvaluationContext,
    simulator: Option<&mut Simulator>,
) -> AlgorithmReport {
    let definition = &algorithm.definition;
    let (outcome, reason, checks) = match patient.applicability(definition) {
        Applicability::NotApplicable { reason } => (Outcome::NotApplicable, Some(reason), vec![]),
        Applicability::Applicable => match simulator {
            Some(sim) => {
                let checks = sim.checks(definition);
                (sim.outcome(), None, checks)
            }
            None => {
                let checks = check_algorithm(definition, patient, ctx);
                (definition.action.resolve(&checks), None, checks)
            }
        },
    };
    AlgorithmReport {
        algorithm_id: algorithm.id,
        algorithm_name: algorithm.name().to_string(),
        action: definition.action,
        outcome,
        reason,
        checks,
    }
}

// ============================================================================
// Log lines
// ============================================================================

fn log_checks(
    algorithm: &Algorithm,
    report: &AlgorithmReport,
    mode: &ExecutionMode,
    handle: &ExecutionHandle,
) {
    if let Some(reason) = &report.reason {
        handle.log(format!("Not applicable: {reason}"), LogLevel::Warning);
        return;
    }

    let mut checks = report.checks.iter();
    for parameter in &algorithm.definition.parameters {
        handle.log(
            format!("Checking {}:", parameter.display_label()),
            LogLevel::Info,
        );
        for sub in &parameter.sub_parameters {
            let Some(check) = checks.next() else {
                return;
            };
            let kind = sub
                .config
                .as_ref()
                .map_or_else(|| "validation".to_string(), |c| c.kind.to_string());
            let level = match &check.verdict {
                Verdict::Pass => LogLevel::Success,
                Verdict::Skipped => LogLevel::Info,
                Verdict::Fail { .. } | Verdict::Missing => LogLevel::Error,
            };
            handle.log(
                format!("  └─ {}: {} → {}", sub.param, kind, check.verdict.tag()),
                level,
            );
            if let (ExecutionMode::Evaluate, Verdict::Fail { reason }) = (mode, &check.verdict) {
                handle.log(format!("     {reason}"), LogLevel::Error);
            }
        }
    }
}

fn log_result(report: &AlgorithmReport, handle: &ExecutionHandle) {
    let level = outcome_level(report.outcome);
    handle.log(format!("Result: {}", report.outcome), level);
    match report.outcome {
        Outcome::Validated => {
            handle.log("All parameters passed validation criteria", level);
            handle.log("Patient analysis approved for reporting", level);
            for check in report.checks.iter().filter(|c| !c.required && c.is_failure()) {
                handle.log(
                    format!(
                        "Optional check failed: {} / {}",
                        check.label, check.sub_parameter
                    ),
                    LogLevel::Warning,
                );
            }
        }
        Outcome::ExpertRequired => {
            handle.log("Some parameters require expert review", level);
            handle.log("Flagged for manual validation", level);
        }
        Outcome::NotApplicable => {
            handle.log("Algorithm skipped for this patient", level);
        }
    }
}

fn outcome_level(outcome: Outcome) -> LogLevel {
    match outcome {
        Outcome::Validated => LogLevel::Success,
        Outcome::ExpertRequired => LogLevel::Warning,
        Outcome::NotApplicable => LogLevel::Info,
    }
}

// ============================================================================
// Tests
// ============================================================================
