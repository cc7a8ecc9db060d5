mod algorithm_execution;
mod workflow_execution;
