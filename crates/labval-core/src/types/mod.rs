//! Core types for labval documents.

mod algorithm;
mod config;
mod ids;
mod outcome;
mod proptests;
mod workflow;

pub use algorithm::{
    Algorithm, AlgorithmDefinition, FinalAction, GlobalParameterValue, Parameter, SubParameter,
};
pub use config::{ConfigValue, ParameterConfig, ValidationType};
pub use ids::DocumentId;
pub use outcome::{CheckResult, Outcome};
pub use workflow::{Workflow, WorkflowDefinition};

pub(crate) use config::{format_number, parse_flag};
