use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use labval_core::{Workflow, WorkflowDefinition};

use crate::error::Result;
use crate::extract::{Payload, document_id};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Workflow>>> {
    Ok(Json(state.store.list_workflows().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Workflow>> {
    let id = document_id(&id)?;
    Ok(Json(state.store.get_workflow(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(definition): Payload<WorkflowDefinition>,
) -> Result<(StatusCode, Json<Workflow>)> {
    let workflow = state.store.create_workflow(definition).await?;
    tracing::info!(
        id = %workflow.id,
        algorithms = workflow.definition.algorithm_order.len(),
        "Workflow created"
    );
    Ok((StatusCode::CREATED, Json(workflow)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(definition): Payload<WorkflowDefinition>,
) -> Result<Json<Workflow>> {
    let id = document_id(&id)?;
    let workflow = state.store.update_workflow(&id, definition).await?;
    tracing::info!(%id, "Workflow updated");
    Ok(Json(workflow))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = document_id(&id)?;
    state.store.delete_workflow(&id).await?;
    tracing::info!(%id, "Workflow deleted");
    Ok(StatusCode::NO_CONTENT)
}
