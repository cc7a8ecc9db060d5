#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod executor;
pub mod handle;
pub mod ids;
pub mod registry;
pub mod simulate;
pub mod types;

mod proptests;

pub use config::ExecutionConfig;
pub use error::{Error, Result};
pub use executor::{Executor, STEPS};
pub use handle::ExecutionHandle;
pub use ids::ExecutionId;
pub use registry::ExecutionRegistry;
pub use types::{
    AlgorithmReport, AnalysisType, DataSource, ExecutionLog, ExecutionMode, ExecutionReport,
    ExecutionRequest, ExecutionState, ExecutionStatus, ExecutionTarget, LogLevel,
};
