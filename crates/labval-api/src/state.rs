//! Shared handler state.

use chrono::{DateTime, Utc};
use labval_store::Store;
use labval_workflows::{ExecutionConfig, ExecutionRegistry, Executor};
use std::sync::Arc;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Document store
    pub store: Store,
    /// Background executions
    pub executions: Arc<ExecutionRegistry>,
    /// When the server state was created
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates state around a store.
    pub fn new(store: Store, execution: ExecutionConfig) -> Self {
        let executor = Executor::new(store.clone(), execution);
        Self {
            store,
            executions: Arc::new(ExecutionRegistry::new(executor)),
            started_at: Utc::now(),
        }
    }

    /// Whole seconds since the state was created, as seen at `now`.
    pub fn uptime(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0)
    }

    /// In-memory state with default execution settings.
    pub fn in_memory() -> Self {
        Self::new(Store::in_memory(), ExecutionConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_uptime() {
        let state = AppState::in_memory();
        assert_eq!(state.uptime(state.started_at), 0);
        assert_eq!(state.uptime(state.started_at + TimeDelta::seconds(90)), 90);
        assert_eq!(state.uptime(state.started_at - TimeDelta::seconds(5)), 0);
    }
}
