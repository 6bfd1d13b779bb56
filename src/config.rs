//! Render and server configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::render::color::Color;
use crate::resource::DEFAULT_FETCH_TIMEOUT;

/// Options for one [`Renderer`](crate::pipeline::Renderer).
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Run template validation first; a failure aborts the render.
    pub validate: bool,
    /// Page background painted before any element.
    pub background: Color,
    /// Per-image download timeout.
    pub fetch_timeout: Duration,
    /// User agent for image downloads.
    pub user_agent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            validate: true,
            background: Color::WHITE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: format!("folio/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Render options shared by every request.
    pub render: RenderOptions,
    /// Directory that relative image paths in templates may read from.
    /// Without one, templates cannot reference local files.
    pub image_root: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            render: RenderOptions::default(),
            image_root: None,
        }
    }
}
