use axum::Json;
use labval_core::scraper::ScraperRequest;
use serde::Serialize;

use crate::error::Result;
use crate::extract::Payload;

#[derive(Debug, Serialize)]
pub struct Preview {
    code: String,
}

pub async fn preview(Payload(request): Payload<ScraperRequest>) -> Result<Json<Preview>> {
    let code = request.generate()?;
    tracing::debug!(
        url = %request.target_url,
        mappings = request.mappings.len(),
        "Scraper script generated"
    );
    Ok(Json(Preview { code }))
}
