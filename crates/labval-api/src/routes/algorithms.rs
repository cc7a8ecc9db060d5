use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use labval_core::{Algorithm, AlgorithmDefinition, EvaluationContext, PatientRecord};
use labval_workflows::AlgorithmReport;
use serde::Deserialize;

use crate::error::Result;
use crate::extract::{Payload, document_id, optional_json};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateBody {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateBody {
    patient: PatientRecord,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Algorithm>>> {
    Ok(Json(state.store.list_algorithms().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Algorithm>> {
    let id = document_id(&id)?;
    Ok(Json(state.store.get_algorithm(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(definition): Payload<AlgorithmDefinition>,
) -> Result<(StatusCode, Json<Algorithm>)> {
    let algorithm = state.store.create_algorithm(definition).await?;
    tracing::info!(id = %algorithm.id, name = algorithm.name(), "Algorithm created");
    Ok((StatusCode::CREATED, Json(algorithm)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(definition): Payload<AlgorithmDefinition>,
) -> Result<Json<Algorithm>> {
    let id = document_id(&id)?;
    let algorithm = state.store.update_algorithm(&id, definition).await?;
    tracing::info!(%id, "Algorithm updated");
    Ok(Json(algorithm))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = document_id(&id)?;
    state.store.delete_algorithm(&id).await?;
    tracing::info!(%id, "Algorithm deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Algorithm>)> {
    let id = document_id(&id)?;
    let body: DuplicateBody = optional_json(&body)?;
    let copy = state
        .store
        .duplicate_algorithm(&id, body.name.as_deref())
        .await?;
    tracing::info!(source = %id, id = %copy.id, "Algorithm duplicated");
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn evaluate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(body): Payload<EvaluateBody>,
) -> Result<Json<AlgorithmReport>> {
    let id = document_id(&id)?;
    let algorithm = state.store.get_algorithm(&id).await?;
    let ctx = body.today.map(EvaluationContext::at).unwrap_or_default();
    let report = state
        .executions
        .executor()
        .evaluate_algorithm(&algorithm, &body.patient, &ctx);
    Ok(Json(report))
}
