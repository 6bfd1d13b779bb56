//! Image resolution: fetches and decodes images behind source references.
//!
//! [`ImageSource`] is the boundary the render pipeline depends on, so that
//! rendering stays free of HTTP and caching concerns. [`DefaultImageSource`]
//! understands three kinds of reference:
//!
//! - `data:image/...;base64,...` URIs, decoded in memory
//! - `http://` and `https://` URLs, downloaded with `reqwest` and cached
//! - anything else, read as a local file path, subject to its [`FileAccess`]
//!
//! Downloads are kept in a bounded cache; the least recently used entry is
//! evicted once the cache is full.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::RenderOptions;
use crate::error::{FolioError, Result};

/// Fetches the pixels behind an image reference.
///
/// Failures are reported as [`FolioError::ResourceUnavailable`]; the render
/// pipeline degrades the element instead of aborting.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<DynamicImage>;
}

fn unavailable(reference: &str, reason: impl std::fmt::Display) -> FolioError {
    FolioError::ResourceUnavailable(format!("{}: {}", abbreviate(reference), reason))
}

/// Keep data URIs from flooding diagnostics.
fn abbreviate(reference: &str) -> String {
    if reference.len() > 64 {
        let cut = reference
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= 48)
            .last()
            .unwrap_or(0);
        format!("{}...", &reference[..cut])
    } else {
        reference.to_string()
    }
}

/// Decode a `data:` URI payload into an image.
pub fn decode_data_uri(uri: &str) -> Result<DynamicImage> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| unavailable(uri, "not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| unavailable(uri, "malformed data URI"))?;
    if !meta.ends_with(";base64") {
        return Err(unavailable(uri, "only base64 data URIs are supported"));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| unavailable(uri, format!("invalid base64: {}", e)))?;
    image::load_from_memory(&bytes).map_err(|e| unavailable(uri, format!("failed to decode image: {}", e)))
}

/// Which local file references a [`DefaultImageSource`] may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAccess {
    /// Any path. Relative paths resolve against the directory when set.
    Any(Option<PathBuf>),
    /// Relative paths under the root only. Absolute paths and `..` are refused.
    Within(PathBuf),
    /// No file references at all.
    Denied,
}

impl FileAccess {
    /// Resolve `path` to a readable location, or explain the refusal.
    pub fn resolve(&self, path: &str) -> std::result::Result<PathBuf, &'static str> {
        match self {
            FileAccess::Any(None) => Ok(PathBuf::from(path)),
            FileAccess::Any(Some(dir)) => Ok(dir.join(path)),
            FileAccess::Denied => Err("file access is disabled"),
            FileAccess::Within(root) => {
                let relative = Path::new(path);
                if relative.as_os_str().is_empty() {
                    return Err("empty file path");
                }
                if !relative.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
                    return Err("path escapes the image root");
                }
                Ok(root.join(relative))
            }
        }
    }
}

/// Downloads kept when no capacity is configured.
pub const DEFAULT_CACHE_ENTRIES: usize = 64;

struct CachedImage {
    image: DynamicImage,
    last_used: AtomicU64,
}

/// Image source backed by an HTTP client, an in-memory cache, and the
/// local filesystem.
pub struct DefaultImageSource {
    http_client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CachedImage>>>,
    cache_capacity: usize,
    clock: AtomicU64,
    files: FileAccess,
}

impl DefaultImageSource {
    /// Create a source with its own HTTP client and empty cache.
    pub fn new(options: &RenderOptions) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.fetch_timeout)
            .build()
            .map_err(|e| FolioError::ResourceUnavailable(format!("HTTP client error: {}", e)))?;
        Ok(Self::with_client(http_client))
    }

    /// Create a source around an existing client.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_capacity: DEFAULT_CACHE_ENTRIES,
            clock: AtomicU64::new(0),
            files: FileAccess::Any(None),
        }
    }

    /// Resolve relative file paths against `dir` (e.g. the template's folder).
    pub fn with_base_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.with_file_access(FileAccess::Any(Some(dir.into())))
    }

    /// Restrict which local files may be read.
    pub fn with_file_access(mut self, files: FileAccess) -> Self {
        self.files = files;
        self
    }

    /// Keep at most `entries` downloads (at least one).
    pub fn with_cache_capacity(mut self, entries: usize) -> Self {
        self.cache_capacity = entries.max(1);
        self
    }

    /// Number of cached downloads.
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    async fn lookup(&self, url: &str) -> Option<DynamicImage> {
        let cache = self.cache.read().await;
        let entry = cache.get(url)?;
        entry.last_used.store(self.tick(), Ordering::Relaxed);
        Some(entry.image.clone())
    }

    async fn remember(&self, url: &str, image: DynamicImage) {
        let mut cache = self.cache.write().await;
        if !cache.contains_key(url) && cache.len() >= self.cache_capacity {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                log::debug!("evicting cached image {}", abbreviate(&key));
                cache.remove(&key);
            }
        }
        cache.insert(
            url.to_string(),
            CachedImage {
                image,
                last_used: AtomicU64::new(self.tick()),
            },
        );
    }

    async fn fetch_url(&self, url: &str) -> Result<DynamicImage> {
        if let Some(image) = self.lookup(url).await {
            return Ok(image);
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(url, format!("download failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(unavailable(url, format!("HTTP {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable(url, format!("failed to read image data: {}", e)))?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| unavailable(url, format!("failed to decode image: {}", e)))?;

        self.remember(url, image.clone()).await;
        Ok(image)
    }

    async fn fetch_file(&self, path: &str) -> Result<DynamicImage> {
        let path = path.strip_prefix("file://").unwrap_or(path);
        let full = self.files.resolve(path).map_err(|reason| unavailable(path, reason))?;
        let bytes = tokio::fs::read(&full)
            .await
            .map_err(|e| unavailable(&full.display().to_string(), e))?;
        image::load_from_memory(&bytes).map_err(|e| unavailable(path, format!("failed to decode image: {}", e)))
    }
}

#[async_trait]
impl ImageSource for DefaultImageSource {
    async fn fetch(&self, reference: &str) -> Result<DynamicImage> {
        if reference.starts_with("data:") {
            decode_data_uri(reference)
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            self.fetch_url(reference).await
        } else {
            self.fetch_file(reference).await
        }
    }
}

/// Image source that only decodes `data:` URIs; every other reference is
/// unavailable. Used where network and filesystem access are unwanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineImageSource;

#[async_trait]
impl ImageSource for OfflineImageSource {
    async fn fetch(&self, reference: &str) -> Result<DynamicImage> {
        if reference.starts_with("data:") {
            decode_data_uri(reference)
        } else {
            Err(unavailable(reference, "offline: only data URIs are available"))
        }
    }
}

/// Timeout used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
