//! Login handler. A single-operator credential gate, not an identity
//! system: the credentials come from config and there is no session
//! state to manage.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Handle POST /api/login.
pub async fn login(State(state): State<Arc<AppState>>, Json(form): Json<LoginForm>) -> Response {
    let creds = &state.config.credentials;
    if form.username == creds.username && form.password == creds.password {
        tracing::info!(username = %form.username, "operator logged in");
        Json(json!({ "user": { "username": form.username } })).into_response()
    } else {
        tracing::warn!(username = %form.username, "rejected login attempt");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "invalid credentials" } })),
        )
            .into_response()
    }
}
