use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    status: &'static str,
    timestamp: DateTime<Utc>,
    store: String,
    version: &'static str,
    started_at: DateTime<Utc>,
    uptime_seconds: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let status = if state.store.is_ready() { "OK" } else { "DEGRADED" };
    let now = Utc::now();
    Json(Health {
        status,
        timestamp: now,
        store: state.store.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.started_at,
        uptime_seconds: state.uptime(now),
    })
}
