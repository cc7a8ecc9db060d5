//! Route table.

mod algorithms;
mod catalog;
mod executions;
mod health;
mod scraper;
mod workflows;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Builds the `/api` router without middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        // Algorithms
        .route(
            "/algorithms",
            get(algorithms::list).post(algorithms::create),
        )
        .route(
            "/algorithms/{id}",
            get(algorithms::get)
                .put(algorithms::update)
                .delete(algorithms::delete),
        )
        .route("/algorithms/{id}/duplicate", post(algorithms::duplicate))
        .route("/algorithms/{id}/evaluate", post(algorithms::evaluate))
        // Workflows
        .route("/workflows", get(workflows::list).post(workflows::create))
        .route(
            "/workflows/{id}",
            get(workflows::get)
                .put(workflows::update)
                .delete(workflows::delete),
        )
        // Catalog and templates
        .route("/catalog/parameters", get(catalog::parameters))
        .route("/catalog/global-parameters", get(catalog::global_parameters))
        .route("/templates", get(catalog::templates))
        .route("/templates/{key}", get(catalog::template))
        .route("/templates/{key}/instantiate", post(catalog::instantiate))
        // Executions
        .route(
            "/executions",
            get(executions::list).post(executions::start),
        )
        .route("/executions/{id}", get(executions::get))
        // Scraper
        .route("/scraper/preview", post(scraper::preview));

    Router::new().nest("/api", api).with_state(state)
}
