use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{DEFAULT_CANVAS, Size};
use crate::foundation::error::{StoryframeError, StoryframeResult};

/// Canvas size as it appears in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS.width,
            height: DEFAULT_CANVAS.height,
        }
    }
}

/// Settings for an export run.
///
/// Read from an optional JSON file; `STORYFRAME_*` environment variables win over the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Multipart ingestion endpoint.
    pub upload_url: Option<String>,
    /// Follow-on job endpoint, called after a successful upload.
    pub trigger_url: Option<String>,
    /// Background-removal endpoint; passthrough when unset.
    pub background_removal_url: Option<String>,
    /// Root for relative image paths.
    pub assets_root: Option<PathBuf>,
    /// Directory scanned for `.ttf`/`.otf` files.
    pub font_dir: Option<PathBuf>,
    /// Font used for unknown families.
    pub default_font: Option<PathBuf>,
    /// Canvas used when a frame has neither a recorded nor a natural size.
    pub default_canvas: CanvasConfig,
    /// Pause between captures.
    pub pacing_ms: u64,
    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
    /// Append a run token to remote overlay URLs.
    pub cache_bust: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            upload_url: None,
            trigger_url: None,
            background_removal_url: None,
            assets_root: None,
            font_dir: None,
            default_font: None,
            default_canvas: CanvasConfig::default(),
            pacing_ms: 0,
            request_timeout_secs: 30,
            cache_bust: true,
        }
    }
}

impl ExportConfig {
    /// Defaults, then `path` (if any), then the process environment.
    pub fn load(path: Option<&Path>) -> StoryframeResult<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> StoryframeResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StoryframeError::config(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_slice(&bytes)
    }

    pub fn from_json_slice(bytes: &[u8]) -> StoryframeResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| StoryframeError::config(format!("config: {e}")))
    }

    /// Apply `STORYFRAME_*` overrides from `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> StoryframeResult<()> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("STORYFRAME_UPLOAD_URL") {
            self.upload_url = Some(v);
        }
        if let Some(v) = get("STORYFRAME_TRIGGER_URL") {
            self.trigger_url = Some(v);
        }
        if let Some(v) = get("STORYFRAME_BG_REMOVAL_URL") {
            self.background_removal_url = Some(v);
        }
        if let Some(v) = get("STORYFRAME_ASSETS_ROOT") {
            self.assets_root = Some(PathBuf::from(v));
        }
        if let Some(v) = get("STORYFRAME_FONT_DIR") {
            self.font_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("STORYFRAME_PACING_MS") {
            self.pacing_ms = v.parse().map_err(|_| {
                StoryframeError::config(format!("STORYFRAME_PACING_MS must be an integer, got '{v}'"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> StoryframeResult<()> {
        if self.default_canvas.width == 0 || self.default_canvas.height == 0 {
            return Err(StoryframeError::config(
                "default_canvas width and height must be > 0",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(StoryframeError::config("request_timeout_secs must be > 0"));
        }
        for (name, url) in [
            ("upload_url", &self.upload_url),
            ("trigger_url", &self.trigger_url),
            ("background_removal_url", &self.background_removal_url),
        ] {
            if let Some(url) = url {
                let lower = url.to_ascii_lowercase();
                if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                    return Err(StoryframeError::config(format!(
                        "{name} must be an http(s) URL, got '{url}'"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn default_canvas_size(&self) -> StoryframeResult<Size> {
        Size::new(self.default_canvas.width, self.default_canvas.height)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
