//! Execution progress handles.
//!
//! An [`ExecutionHandle`] is shared between the task running an execution
//! and everyone observing it. Every update replaces the current
//! [`ExecutionStatus`] and is broadcast through a watch channel.
//!
//! # Usage
//!
//! ```rust
//! use labval_core::DocumentId;
//! use labval_workflows::{ExecutionHandle, ExecutionId, ExecutionState, ExecutionTarget};
//!
//! let handle = ExecutionHandle::new(ExecutionId::new(), ExecutionTarget::Algorithm(DocumentId::new()));
//! assert_eq!(handle.status().state, ExecutionState::Pending);
//!
//! handle.start();
//! handle.step("Initializing algorithm...");
//! assert_eq!(handle.status().status, "Initializing algorithm...");
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::ids::ExecutionId;
use crate::types::{
    ExecutionLog, ExecutionReport, ExecutionState, ExecutionStatus, ExecutionTarget, LogLevel,
};

// ============================================================================
// ExecutionHandle
// ============================================================================

/// Thread-safe handle for observing and updating an execution.
///
/// Cheap to clone (Arc internals). Status changes are broadcast
/// to all subscribers via a watch channel.
#[derive(Clone)]
pub struct ExecutionHandle {
    inner: Arc<ExecutionHandleInner>,
}

struct ExecutionHandleInner {
    id: ExecutionId,
    tx: watch::Sender<ExecutionStatus>,
}

impl ExecutionHandle {
    /// Create a handle for an accepted execution.
    ///
    /// Initial state is [`ExecutionState::Pending`].
    pub fn new(id: ExecutionId, target: ExecutionTarget) -> Self {
        let (tx, _rx) = watch::channel(ExecutionStatus::pending(id, target));
        Self {
            inner: Arc::new(ExecutionHandleInner { id, tx }),
        }
    }

    /// Execution id.
    pub fn id(&self) -> ExecutionId {
        self.inner.id
    }

    /// Current snapshot.
    pub fn status(&self) -> ExecutionStatus {
        self.inner.tx.borrow().clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExecutionState {
        self.inner.tx.borrow().state
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<ExecutionStatus> {
        self.inner.tx.subscribe()
    }

    /// Marks the execution as running and clears earlier logs.
    pub fn start(&self) {
        tracing::info!(execution_id = %self.inner.id, "Execution started");
        self.inner.tx.send_modify(|status| {
            status.state = ExecutionState::Running;
            status.progress = 0.0;
            status.logs.clear();
        });
    }

    /// Enters a step: sets the status text and logs it.
    pub fn step(&self, name: &str) {
        tracing::debug!(execution_id = %self.inner.id, step = name, "Execution step");
        self.inner.tx.send_modify(|status| {
            status.status = name.to_string();
            status.logs.push(ExecutionLog::new(name, LogLevel::Info));
        });
    }

    /// Appends a log line.
    pub fn log(&self, message: impl Into<String>, level: LogLevel) {
        let line = ExecutionLog::new(message, level);
        self.inner.tx.send_modify(|status| status.logs.push(line));
    }

    /// Sets the progress percentage, clamped to 0..=100.
    pub fn set_progress(&self, progress: f64) {
        self.inner
            .tx
            .send_modify(|status| status.progress = progress.clamp(0.0, 100.0));
    }

    /// Finishes the execution with its report.
    pub fn complete(&self, report: ExecutionReport) {
        tracing::info!(
            execution_id = %self.inner.id,
            outcome = %report.outcome,
            "Execution completed"
        );
        self.inner.tx.send_modify(|status| {
            status.state = ExecutionState::Completed;
            status.progress = 100.0;
            status.status = format!("Execution Complete: {}", report.outcome);
            status.report = Some(report);
        });
    }

    /// Stops the execution with an error.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(execution_id = %self.inner.id, %reason, "Execution failed");
        self.inner.tx.send_modify(|status| {
            status.state = ExecutionState::Failed;
            status.status = format!("Execution Failed: {reason}");
            status
                .logs
                .push(ExecutionLog::new(format!("Error: {reason}"), LogLevel::Error));
            status.error = Some(reason);
        });
    }

    /// Wait until the execution completes, fails, or the timeout expires.
    ///
    /// # Errors
    ///
    /// [`Error::ExecutionFailed`] when the execution stopped with an error,
    /// [`Error::Timeout`] when it is still running after `timeout`.
    pub async fn wait_finished(&self, timeout: Duration) -> Result<ExecutionStatus> {
        let mut rx = self.subscribe();
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        loop {
            {
                let status = rx.borrow_and_update().clone();
                match status.state {
                    ExecutionState::Completed => return Ok(status),
                    ExecutionState::Failed => {
                        return Err(Error::ExecutionFailed {
                            id: self.inner.id,
                            reason: status.error.unwrap_or_default(),
                        });
                    }
                    _ => {}
                }
            }

            tokio::select! {
                _ = &mut deadline => {
                    return Err(Error::Timeout {
                        id: self.inner.id,
                        waited: timeout,
                    });
                }
                result = rx.changed() => {
                    if result.is_err() {
                        // Sender lives in `self`; only reachable if it was dropped elsewhere
                        return Err(Error::ExecutionFailed {
                            id: self.inner.id,
                            reason: "status channel closed".to_string(),
                        });
                    }
                }
            }
        }
    }
}

impl fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
