use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{StoryframeError, StoryframeResult};

/// Query parameter appended to remote URLs to defeat stale HTTP caches.
pub const CACHE_BUST_PARAM: &str = "sf_cb";

/// Source of image bytes for a URL or path.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Fetch the raw bytes behind `reference`.
    async fn load(&self, reference: &str) -> StoryframeResult<Vec<u8>>;
}

/// Append the cache-bust token to an http(s) URL. Other references pass through untouched.
pub fn cache_bust(reference: &str, token: &str) -> String {
    if !is_remote(reference) || token.is_empty() {
        return reference.to_string();
    }
    let (base, fragment) = match reference.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (reference, None),
    };
    let sep = if base.contains('?') { '&' } else { '?' };
    let mut out = format!("{base}{sep}{CACHE_BUST_PARAM}={token}");
    if let Some(f) = fragment {
        out.push('#');
        out.push_str(f);
    }
    out
}

fn is_remote(reference: &str) -> bool {
    let lower = reference.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Loader for http(s) URLs, `file://` URLs and filesystem paths.
///
/// Relative paths are joined onto `assets_root` when one is configured.
#[derive(Clone, Debug)]
pub struct HttpImageLoader {
    client: reqwest::Client,
    assets_root: Option<PathBuf>,
}

impl HttpImageLoader {
    /// Build a loader with its own HTTP client.
    pub fn new(timeout: Duration, assets_root: Option<PathBuf>) -> StoryframeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoryframeError::config(format!("build http client: {e}")))?;
        Ok(Self::with_client(client, assets_root))
    }

    /// Build a loader around an existing client.
    pub fn with_client(client: reqwest::Client, assets_root: Option<PathBuf>) -> Self {
        Self {
            client,
            assets_root,
        }
    }

    fn local_path(&self, reference: &str) -> PathBuf {
        let raw = reference.strip_prefix("file://").unwrap_or(reference);
        let p = Path::new(raw);
        match &self.assets_root {
            Some(root) if p.is_relative() => root.join(p),
            _ => p.to_path_buf(),
        }
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn load(&self, reference: &str) -> StoryframeResult<Vec<u8>> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(StoryframeError::load("empty image reference"));
        }
        if !is_remote(reference) {
            let path = self.local_path(reference);
            return tokio::fs::read(&path).await.map_err(|e| {
                StoryframeError::load(format!("read '{}': {e}", path.display()))
            });
        }

        let url = reference;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoryframeError::load(format!("GET {url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoryframeError::load(format!("GET {url}: status {status}")));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoryframeError::load(format!("read body of {url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// In-memory loader keyed by reference. Query strings are ignored on lookup misses.
#[derive(Debug, Default)]
pub struct MemoryImageLoader {
    entries: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes for a reference.
    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(reference.into(), bytes);
    }

    /// Builder form of [`MemoryImageLoader::insert`].
    pub fn with(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(reference, bytes);
        self
    }

    /// Every reference requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageLoader for MemoryImageLoader {
    async fn load(&self, reference: &str) -> StoryframeResult<Vec<u8>> {
        if let Ok(mut r) = self.requests.lock() {
            r.push(reference.to_string());
        }
        if let Some(bytes) = self.entries.get(reference) {
            return Ok(bytes.clone());
        }
        let bare = reference.split(['?', '#']).next().unwrap_or(reference);
        self.entries
            .get(bare)
            .cloned()
            .ok_or_else(|| StoryframeError::load(format!("no image registered for '{reference}'")))
    }
}

/// External service that strips the background from an overlay image.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Return the URL of a background-free copy of `image_url`.
    async fn remove_background(&self, image_url: &str) -> StoryframeResult<String>;
}

/// Remover that returns the input unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughBackgroundRemover;

#[async_trait]
impl BackgroundRemover for PassthroughBackgroundRemover {
    async fn remove_background(&self, image_url: &str) -> StoryframeResult<String> {
        Ok(image_url.to_string())
    }
}

#[derive(Serialize)]
struct RemoveBackgroundRequest<'a> {
    image_url: &'a str,
}

#[derive(Deserialize)]
struct RemoveBackgroundResponse {
    // `image_url` is the request field; services that echo it must not shadow `url`.
    #[serde(alias = "imageUrl", alias = "resultUrl")]
    url: String,
}

/// Remover backed by an HTTP endpoint: `POST {"image_url"}` answering `{"url"}`.
#[derive(Clone, Debug)]
pub struct HttpBackgroundRemover {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackgroundRemover {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl BackgroundRemover for HttpBackgroundRemover {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn remove_background(&self, image_url: &str) -> StoryframeResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RemoveBackgroundRequest { image_url })
            .send()
            .await
            .map_err(|e| StoryframeError::network(format!("background removal: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoryframeError::http_status(
                "background removal",
                status.as_u16(),
                &body,
            ));
        }
        let parsed: RemoveBackgroundResponse = response
            .json()
            .await
            .map_err(|e| StoryframeError::serde(format!("background removal response: {e}")))?;
        if parsed.url.trim().is_empty() {
            return Err(StoryframeError::validation(
                "background removal returned an empty url",
            ));
        }
        Ok(parsed.url)
    }
}

/// Ask `remover` for a cleaned copy, falling back to the original URL on any failure.
pub async fn remove_background_or_original(
    remover: &dyn BackgroundRemover,
    image_url: &str,
) -> String {
    match remover.remove_background(image_url).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(image_url, error = %e, "background removal failed; using original");
            image_url.to_string()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
