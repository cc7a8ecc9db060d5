#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! labval Core Library
//!
//! Domain model, catalog, templates and rule interpreter shared by every
//! labval crate.

pub mod catalog;
pub mod error;
pub mod record;
pub mod rules;
pub mod scraper;
pub mod types;

// Re-exports for convenience
pub use error::{Error, Result};
pub use record::{Applicability, PatientRecord};
pub use rules::{EvaluationContext, Observation, Rule, Verdict};
pub use types::{
    Algorithm, AlgorithmDefinition, CheckResult, ConfigValue, DocumentId, FinalAction,
    GlobalParameterValue, Outcome, Parameter, ParameterConfig, SubParameter, ValidationType,
    Workflow, WorkflowDefinition,
};
