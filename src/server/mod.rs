//! # HTTP Server
//!
//! REST surface over the invoice core. Every success body is
//! `{<resource>: ...}`, every failure `{error: {message}}` with a
//! matching status, so the UI has exactly one shape per outcome.
//!
//! ## Usage
//!
//! ```bash
//! lekha serve --listen 0.0.0.0:8080
//! ```

mod handlers;
mod state;

pub use state::AppState;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::LekhaError;
use crate::mailer::Mailer;
use crate::storage::Store;

/// Uploaded invoice PDFs cap out well under this.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Build the application router around injected collaborators. Exposed
/// separately from [`serve`] so tests can drive it without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/login", post(handlers::auth::login))
        .route("/api/status", get(handlers::status::status))
        .route("/api/templates", get(handlers::templates::list))
        .route("/api/templates/:id", get(handlers::templates::get))
        .route(
            "/api/companies",
            get(handlers::companies::list).post(handlers::companies::create),
        )
        .route(
            "/api/companies/:id",
            get(handlers::companies::get)
                .put(handlers::companies::update)
                .delete(handlers::companies::remove),
        )
        .route("/api/dashboard", get(handlers::companies::dashboard))
        .route(
            "/api/invoices",
            get(handlers::invoices::list).post(handlers::invoices::create),
        )
        .route(
            "/api/invoices/:id",
            get(handlers::invoices::get)
                .put(handlers::invoices::update)
                .delete(handlers::invoices::remove),
        )
        .route("/api/invoices/:id/email", post(handlers::invoices::email))
        .route("/api/invoices/:id/pdf", get(handlers::invoices::pdf))
        .route(
            "/api/invoices/:id/preview.png",
            get(handlers::invoices::preview),
        )
        .route(
            "/api/invoices/:id/document.html",
            get(handlers::invoices::document),
        )
        .route("/api/render/pdf", post(handlers::render::pdf))
        .route("/api/render/preview.png", post(handlers::render::preview))
        .route("/api/render/html", post(handlers::render::html))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server. Opens the store before accepting traffic and
/// closes it when the listener winds down.
pub async fn serve(
    config: Config,
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
) -> Result<(), LekhaError> {
    store.open().await?;

    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(AppState::new(config, store.clone(), mailer));
    let app = router(state);

    tracing::info!(listen = %listen_addr, "lekha server starting");

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| {
            LekhaError::Transport(format!("failed to bind to {}: {}", listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| LekhaError::Transport(format!("server error: {}", e)))?;

    store.close().await?;
    Ok(())
}
