//! Server state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::pipeline::Renderer;
use crate::resource::{DefaultImageSource, FileAccess};

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Shared by every request; its image cache persists across renders.
    pub renderer: Renderer,
}

impl AppState {
    /// State with a renderer that reads local files only under the
    /// configured image root.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let files = match &config.image_root {
            Some(root) => FileAccess::Within(root.clone()),
            None => FileAccess::Denied,
        };
        let images = DefaultImageSource::new(&config.render)?.with_file_access(files);
        let renderer = Renderer::new(Arc::new(images), config.render.clone());
        Ok(Self { config, renderer })
    }

    /// State around an existing renderer.
    pub fn with_renderer(config: ServerConfig, renderer: Renderer) -> Self {
        Self { config, renderer }
    }
}
