//! Template catalog handlers. Read-only reference data.

use axum::{extract::Path, Json};
use serde_json::{json, Value};

use crate::catalog;
use crate::error::LekhaError;

/// Handle GET /api/templates.
pub async fn list() -> Json<Value> {
    Json(json!({ "templates": catalog::template_options() }))
}

/// Handle GET /api/templates/:id.
pub async fn get(Path(id): Path<String>) -> Result<Json<Value>, LekhaError> {
    let template = catalog::template_by_id(&id)
        .ok_or_else(|| LekhaError::NotFound(format!("template {}", id)))?;
    Ok(Json(json!({ "template": template })))
}
