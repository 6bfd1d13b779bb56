//! # HTTP Server for Template Rendering
//!
//! Exposes the render pipeline over HTTP for editors and previewers.
//!
//! ## Usage
//!
//! ```bash
//! folio serve --listen 0.0.0.0:8080
//! ```
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `POST /api/render` | `{template, data}` | `application/pdf` |
//! | `POST /api/preview` | `{template, data}` | `image/png` |
//! | `POST /api/validate` | template | `{valid, issues}` |
//! | `GET /api/element-types` | | element type catalogue |

mod handlers;
mod state;

pub use handlers::render::{RenderRequest, ValidateResponse};
pub use state::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::{FolioError, Result};

/// Templates may carry inline `data:` images.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Build the application router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/render", post(handlers::render::render))
        .route("/api/preview", post(handlers::render::preview))
        .route("/api/validate", post(handlers::render::validate))
        .route("/api/element-types", get(handlers::types::list))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use folio::config::ServerConfig;
/// use folio::server::serve;
///
/// # async fn example() -> folio::error::Result<()> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(config)?);
    let config = &state.config;
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| FolioError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e)))?;
    log::info!("folio server listening on http://{}/", config.listen_addr);
    match &config.image_root {
        Some(root) => log::info!("serving local images from {}", root.display()),
        None => log::info!("local image paths are disabled"),
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| FolioError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
