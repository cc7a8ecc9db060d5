use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use labval_core::catalog::{
    self, AlgorithmTemplate, GlobalParameter, ParameterDefinition, TemplateSummary,
};
use labval_core::Algorithm;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::extract::{Query, optional_json};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ParameterFilter {
    #[serde(default)]
    global: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantiateBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

pub async fn parameters(
    Query(filter): Query<ParameterFilter>,
) -> Json<Vec<&'static ParameterDefinition>> {
    let definitions = match filter.global {
        Some(true) => catalog::global_parameter_definitions().collect(),
        Some(false) => catalog::specific_parameter_definitions().collect(),
        None => catalog::parameter_definitions().iter().collect(),
    };
    Json(definitions)
}

pub async fn global_parameters() -> Json<&'static [GlobalParameter]> {
    Json(catalog::global_parameters())
}

pub async fn templates() -> Json<Vec<TemplateSummary>> {
    Json(
        catalog::templates()
            .iter()
            .map(AlgorithmTemplate::summary)
            .collect(),
    )
}

pub async fn template(Path(key): Path<String>) -> Result<Json<&'static AlgorithmTemplate>> {
    Ok(Json(lookup(&key)?))
}

pub async fn instantiate(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Algorithm>)> {
    let template = lookup(&key)?;
    let body: InstantiateBody = optional_json(&body)?;
    let definition = template.instantiate(
        body.name.as_deref().unwrap_or_default(),
        body.description.as_deref().unwrap_or_default(),
    );
    let algorithm = state.store.create_algorithm(definition).await?;
    tracing::info!(template = %key, id = %algorithm.id, "Template instantiated");
    Ok((StatusCode::CREATED, Json(algorithm)))
}

fn lookup(key: &str) -> Result<&'static AlgorithmTemplate> {
    catalog::template(key).map_err(|e| Error::not_found(e.to_string()))
}
