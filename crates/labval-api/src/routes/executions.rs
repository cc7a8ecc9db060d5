use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use labval_workflows::{ExecutionId, ExecutionRequest, ExecutionStatus};

use crate::error::{Error, Result};
use crate::extract::Payload;
use crate::state::AppState;

pub async fn start(
    State(state): State<AppState>,
    Payload(request): Payload<ExecutionRequest>,
) -> Result<(StatusCode, Json<ExecutionStatus>)> {
    let handle = state.executions.submit(request).await?;
    Ok((StatusCode::ACCEPTED, Json(handle.status())))
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<ExecutionStatus>> {
    Json(state.executions.list())
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExecutionStatus>> {
    let id: ExecutionId = id
        .parse()
        .map_err(|_| Error::bad_request(format!("Invalid execution id: '{id}'")))?;
    Ok(Json(state.executions.get(&id)?.status()))
}
