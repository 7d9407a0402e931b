//! Status probe.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::super::state::AppState;

/// Handle GET /api/status.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Json(json!({
        "status": {
            "service": "lekha",
            "version": env!("CARGO_PKG_VERSION"),
            "uptimeSecs": now.saturating_sub(state.boot_time),
        }
    }))
}
