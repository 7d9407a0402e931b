//! Render an unsaved document payload. These endpoints back the live
//! editor: the client posts the current InvoiceDocument and gets the
//! corresponding artifact without anything being persisted.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};

use super::super::state::AppState;
use crate::error::LekhaError;
use crate::invoice::InvoiceDocument;
use crate::render;

/// PDF assembly off the async runtime. Signature resolution happens
/// here so one resolve covers the whole document pass.
pub(crate) async fn pdf_bytes(
    state: &Arc<AppState>,
    doc: InvoiceDocument,
) -> Result<Vec<u8>, LekhaError> {
    let signature = state.signatures.resolve().await;
    let issuer = state.config.issuer.clone();
    tokio::task::spawn_blocking(move || render::pdf::emit(&doc, &issuer, &signature))
        .await
        .map_err(|e| LekhaError::Render(format!("render task failed: {}", e)))?
}

/// Canvas rasterization off the async runtime.
pub(crate) async fn preview_bytes(
    state: &Arc<AppState>,
    doc: InvoiceDocument,
) -> Result<Vec<u8>, LekhaError> {
    let signature = state.signatures.resolve().await;
    let issuer = state.config.issuer.clone();
    tokio::task::spawn_blocking(move || render::canvas::render(&doc, &issuer, &signature))
        .await
        .map_err(|e| LekhaError::Render(format!("render task failed: {}", e)))?
}

/// Handle POST /api/render/pdf.
pub async fn pdf(
    State(state): State<Arc<AppState>>,
    Json(doc): Json<InvoiceDocument>,
) -> Result<Response, LekhaError> {
    let bytes = pdf_bytes(&state, doc).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
        ],
        bytes,
    )
        .into_response())
}

/// Handle POST /api/render/preview.png.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(doc): Json<InvoiceDocument>,
) -> Result<Response, LekhaError> {
    let png = preview_bytes(&state, doc).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Handle POST /api/render/html.
pub async fn html(
    State(state): State<Arc<AppState>>,
    Json(doc): Json<InvoiceDocument>,
) -> Result<Html<String>, LekhaError> {
    let signature = state.signatures.resolve().await;
    Ok(Html(render::html::render(
        &doc,
        &state.config.issuer,
        &signature,
    )))
}
