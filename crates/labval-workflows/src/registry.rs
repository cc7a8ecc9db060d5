//! Background executions.
//!
//! The registry spawns each accepted request on a tokio task and keeps its
//! [`ExecutionHandle`] around so the status can be polled later. At most
//! `max_retained` executions are kept; the oldest finished one makes room
//! for a new one.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::handle::ExecutionHandle;
use crate::ids::ExecutionId;
use crate::types::{ExecutionRequest, ExecutionStatus};

/// Spawns executions and retains their handles.
#[derive(Debug)]
pub struct ExecutionRegistry {
    executor: Arc<Executor>,
    executions: Mutex<VecDeque<ExecutionHandle>>,
    max_retained: usize,
}

impl ExecutionRegistry {
    /// Creates a registry that retains `executor.config().max_retained`
    /// executions.
    pub fn new(executor: Executor) -> Self {
        let max_retained = executor.config().max_retained.max(1);
        Self {
            executor: Arc::new(executor),
            executions: Mutex::new(VecDeque::new()),
            max_retained,
        }
    }

    /// The executor used for new executions.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Checks that the target exists, then spawns the execution.
    ///
    /// # Errors
    ///
    /// Store errors when the algorithm or workflow cannot be resolved.
    pub async fn submit(&self, request: ExecutionRequest) -> Result<ExecutionHandle> {
        self.executor.resolve(&request.target).await?;
        Ok(self.spawn(request))
    }

    /// Runs the request on a tokio task and returns its handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, request: ExecutionRequest) -> ExecutionHandle {
        let handle = ExecutionHandle::new(ExecutionId::new(), request.target);
        self.retain(handle.clone());

        let executor = Arc::clone(&self.executor);
        let task_handle = handle.clone();
        let task = tokio::spawn(async move {
            // Failures are recorded on the handle
            let _ = executor.run(&request, &task_handle).await;
        });
        tokio::spawn(supervise(task, handle.clone()));

        tracing::info!(
            execution_id = %handle.id(),
            target = %handle.status().target,
            "Execution accepted"
        );
        handle
    }

    /// Looks up a retained execution.
    ///
    /// # Errors
    ///
    /// [`Error::ExecutionNotFound`] when the id is unknown or was evicted.
    pub fn get(&self, id: &ExecutionId) -> Result<ExecutionHandle> {
        self.lock()
            .iter()
            .find(|h| h.id() == *id)
            .cloned()
            .ok_or(Error::ExecutionNotFound { id: *id })
    }

    /// Status of every retained execution, oldest first.
    pub fn list(&self) -> Vec<ExecutionStatus> {
        self.lock().iter().map(ExecutionHandle::status).collect()
    }

    /// Number of retained executions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when no execution is retained.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn retain(&self, handle: ExecutionHandle) {
        let mut executions = self.lock();
        while executions.len() >= self.max_retained {
            let Some(oldest) = executions.iter().position(|h| h.state().is_finished()) else {
                tracing::warn!(
                    retained = executions.len(),
                    "No finished execution to evict; retaining over capacity"
                );
                break;
            };
            if let Some(evicted) = executions.remove(oldest) {
                tracing::debug!(execution_id = %evicted.id(), "Evicted execution");
            }
        }
        executions.push_back(handle);
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ExecutionHandle>> {
        self.executions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fails the handle if the execution task dies without finishing it.
async fn supervise(task: JoinHandle<()>, handle: ExecutionHandle) {
    let Err(e) = task.await else {
        return;
    };
    tracing::error!(execution_id = %handle.id(), error = %e, "Execution task aborted");
    if !handle.state().is_finished() {
        let reason = if e.is_panic() {
            "execution task panicked"
        } else {
            "execution task cancelled"
        };
        handle.fail(reason);
    }
}
