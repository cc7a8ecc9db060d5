//! Extractors that reject with JSON errors.

use axum::extract::{FromRequest, FromRequestParts};
use labval_core::DocumentId;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// JSON request body; malformed bodies become `400 {"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Payload<T>(pub T);

/// Query string; malformed queries become `400 {"error": ...}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);

/// Parses a document id taken from the path.
pub fn document_id(raw: &str) -> Result<DocumentId> {
    Ok(raw.parse::<DocumentId>()?)
}

/// Parses an optional JSON body; an empty body yields the default.
pub fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| Error::bad_request(format!("Failed to parse the request body as JSON: {e}")))
}
