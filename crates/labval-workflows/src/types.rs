//! Execution requests, status snapshots and reports.

use chrono::{DateTime, NaiveDate, Utc};
use labval_core::{CheckResult, DocumentId, FinalAction, Outcome, PatientRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::ExecutionId;

/// What to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionTarget {
    /// A single algorithm
    Algorithm(DocumentId),
    /// Every algorithm of a workflow, in order
    Workflow(DocumentId),
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionTarget::Algorithm(id) => write!(f, "algorithm {id}"),
            ExecutionTarget::Workflow(id) => write!(f, "workflow {id}"),
        }
    }
}

/// Kind of analysis being validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    /// Blood analysis
    #[default]
    Blood,
    /// Urine analysis
    Urine,
    /// Biochemistry
    Biochemistry,
    /// Hematology
    Hematology,
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnalysisType::Blood => "blood",
            AnalysisType::Urine => "urine",
            AnalysisType::Biochemistry => "biochemistry",
            AnalysisType::Hematology => "hematology",
        };
        f.write_str(s)
    }
}

/// Where the patient data came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Typed in by a technician
    #[default]
    Manual,
    /// Read by a web scraper
    Scraper,
    /// Uploaded file
    File,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataSource::Manual => "manual",
            DataSource::Scraper => "scraper",
            DataSource::File => "file",
        };
        f.write_str(s)
    }
}

/// How checks and outcomes are decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Check the patient's observations against the rules.
    #[default]
    Evaluate,
    /// Draw check results and the outcome at random.
    Simulate {
        /// Seed for reproducible runs
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

/// A request to run an algorithm or workflow for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    /// What to run
    pub target: ExecutionTarget,

    /// Patient data
    pub patient: PatientRecord,

    /// Kind of analysis
    #[serde(default)]
    pub analysis_type: AnalysisType,

    /// Origin of the data
    #[serde(default)]
    pub data_source: DataSource,

    /// Evaluation or simulation
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Reference date for date rules; today when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
}

impl ExecutionRequest {
    /// Evaluates `target` for `patient` with default settings.
    pub fn new(target: ExecutionTarget, patient: PatientRecord) -> Self {
        Self {
            target,
            patient,
            analysis_type: AnalysisType::default(),
            data_source: DataSource::default(),
            mode: ExecutionMode::default(),
            today: None,
        }
    }

    /// Switches to simulation.
    pub fn simulated(mut self, seed: Option<u64>) -> Self {
        self.mode = ExecutionMode::Simulate { seed };
        self
    }

    /// Sets the analysis type.
    pub fn with_analysis_type(mut self, analysis_type: AnalysisType) -> Self {
        self.analysis_type = analysis_type;
        self
    }

    /// Sets the reference date.
    pub fn on(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// Severity of a log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Progress information
    #[default]
    Info,
    /// Something passed
    Success,
    /// Something failed
    Error,
    /// Needs attention
    Warning,
}

/// One line of the execution log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLog {
    /// When the line was written
    pub timestamp: DateTime<Utc>,
    /// Text
    pub message: String,
    /// Severity
    pub level: LogLevel,
}

impl ExecutionLog {
    /// Creates a log line stamped now.
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            level,
        }
    }
}

/// Lifecycle of an execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    /// Accepted, not started.
    #[default]
    Pending,
    /// Running steps.
    Running,
    /// Finished with a report.
    Completed,
    /// Stopped with an error.
    Failed,
}

impl ExecutionState {
    /// Returns `true` once the execution can no longer change.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatus {
    /// Execution id
    pub execution_id: ExecutionId,

    /// What is being run
    pub target: ExecutionTarget,

    /// Lifecycle state
    pub state: ExecutionState,

    /// Percentage of steps done (0 to 100)
    pub progress: f64,

    /// Current step or final result, e.g. `Execution Complete: VALIDATED`
    pub status: String,

    /// Failure reason when `state` is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Log lines so far
    #[serde(default)]
    pub logs: Vec<ExecutionLog>,

    /// Final report once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ExecutionReport>,

    /// When the execution was accepted
    pub created_at: DateTime<Utc>,
}

impl ExecutionStatus {
    /// Initial snapshot of an accepted execution.
    pub fn pending(execution_id: ExecutionId, target: ExecutionTarget) -> Self {
        Self {
            execution_id,
            target,
            state: ExecutionState::Pending,
            progress: 0.0,
            status: "Ready to execute algorithm".to_string(),
            error: None,
            logs: Vec::new(),
            report: None,
            created_at: Utc::now(),
        }
    }
}

/// Result of one algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmReport {
    /// Algorithm id
    pub algorithm_id: DocumentId,
    /// Algorithm name
    pub algorithm_name: String,
    /// Final action of the algorithm
    pub action: FinalAction,
    /// Decision
    pub outcome: Outcome,
    /// Why the algorithm did not apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Individual checks (empty when not applicable)
    #[serde(default)]
    pub checks: Vec<CheckResult>,
}

impl AlgorithmReport {
    /// Number of failing checks.
    pub fn failures(&self) -> usize {
        self.checks.iter().filter(|c| c.is_failure()).count()
    }
}

/// Result of a whole execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    /// Execution id
    pub execution_id: ExecutionId,
    /// Patient identifier
    pub patient_id: String,
    /// What was run
    pub target: ExecutionTarget,
    /// How it was run
    pub mode: ExecutionMode,
    /// Overall decision
    pub outcome: Outcome,
    /// Per-algorithm results, in execution order
    pub algorithms: Vec<AlgorithmReport>,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub completed_at: DateTime<Utc>,
}

/// Combines algorithm outcomes into the outcome of a workflow.
///
/// `VALIDATED` when every applicable algorithm validated and at least one
/// applied, `NOT_APPLICABLE` when none applied, `EXPERT_REQUIRED` otherwise.
pub fn aggregate_outcome<I>(outcomes: I) -> Outcome
where
    I: IntoIterator<Item = Outcome>,
{
    let mut applied = false;
    for outcome in outcomes {
        match outcome {
            Outcome::NotApplicable => {}
            Outcome::Validated => applied = true,
            Outcome::ExpertRequired => return Outcome::ExpertRequired,
        }
    }
    if applied {
        Outcome::Validated
    } else {
        Outcome::NotApplicable
    }
}
