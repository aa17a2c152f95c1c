use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::capture::live::{LivePresentation, TextVisibilityGuard};
use crate::foundation::error::StoryframeError;
use crate::render::compositor::{CompositeOptions, FrameCompositor};
use crate::render::surface::FrameRGBA;
use crate::scene::model::Frame;

/// Why a tier did not produce a frame.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// Preconditions for this tier do not hold.
    #[error("skipped: {0}")]
    Skipped(String),
    /// The tier ran but had nothing to return.
    #[error("tier produced no frame")]
    Empty,
    /// The tier failed.
    #[error(transparent)]
    Failed(#[from] StoryframeError),
}

/// Fidelity tiers, highest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureTierKind {
    /// Snapshot of the live presentation.
    LiveSnapshot,
    /// Synthetic composite of base image and elements.
    Composite,
    /// Base image alone.
    BaseReencode,
}

impl CaptureTierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LiveSnapshot => "live_snapshot",
            Self::Composite => "composite",
            Self::BaseReencode => "base_reencode",
        }
    }
}

/// What the caller wants baked into the captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Keep captions in the output.
    pub include_text: bool,
    /// Keep overlays in the output.
    pub include_overlays: bool,
    /// Try the live snapshot tier at all.
    pub prefer_live: bool,
}

impl CaptureOptions {
    /// Batch export: overlays baked, captions left live downstream.
    pub const EXPORT: Self = Self {
        include_text: false,
        include_overlays: true,
        prefer_live: true,
    };
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::EXPORT
    }
}

/// One (scene, image) pair to capture.
#[derive(Clone, Copy, Debug)]
pub struct CaptureRequest<'a> {
    pub scene_number: u32,
    pub image_index: usize,
    pub frame: &'a Frame,
    pub options: CaptureOptions,
}

/// A strategy for obtaining a rendered frame.
#[async_trait]
pub trait CaptureTier: Send + Sync {
    fn kind(&self) -> CaptureTierKind;

    async fn capture(&self, request: &CaptureRequest<'_>) -> Result<FrameRGBA, CaptureError>;
}

/// Tier 1: snapshot of the live presentation.
pub struct LiveSnapshotTier {
    live: Arc<dyn LivePresentation>,
}

impl LiveSnapshotTier {
    pub fn new(live: Arc<dyn LivePresentation>) -> Self {
        Self { live }
    }
}

#[async_trait]
impl CaptureTier for LiveSnapshotTier {
    fn kind(&self) -> CaptureTierKind {
        CaptureTierKind::LiveSnapshot
    }

    async fn capture(&self, request: &CaptureRequest<'_>) -> Result<FrameRGBA, CaptureError> {
        let opts = request.options;
        if !opts.prefer_live {
            return Err(CaptureError::Skipped("live capture not requested".into()));
        }
        if !opts.include_overlays {
            return Err(CaptureError::Skipped("overlays not wanted".into()));
        }
        if !request.frame.overlays_bakeable {
            return Err(CaptureError::Skipped(
                "frame forbids baking overlays".into(),
            ));
        }

        let target = (request.scene_number, request.image_index);
        if self.live.current() != Some(target) {
            self.live.switch_to(target.0, target.1).await?;
            self.live.settle().await;
        }

        let _guard = (!opts.include_text).then(|| TextVisibilityGuard::hide(self.live.as_ref()));
        match self.live.snapshot(target.0, target.1).await? {
            Some(frame) => Ok(frame),
            None => Err(CaptureError::Empty),
        }
    }
}

/// Tier 2: synthetic composite from the frame's base image and element metadata.
pub struct CompositeTier {
    compositor: Arc<FrameCompositor>,
}

impl CompositeTier {
    pub fn new(compositor: Arc<FrameCompositor>) -> Self {
        Self { compositor }
    }
}

#[async_trait]
impl CaptureTier for CompositeTier {
    fn kind(&self) -> CaptureTierKind {
        CaptureTierKind::Composite
    }

    async fn capture(&self, request: &CaptureRequest<'_>) -> Result<FrameRGBA, CaptureError> {
        let options = CompositeOptions {
            include_text: request.options.include_text,
            include_overlays: request.options.include_overlays,
        };
        self.compositor
            .composite_frame(request.frame, None, options)
            .await?
            .ok_or(CaptureError::Empty)
    }
}

/// Tier 3: base image re-encoded at recorded-or-natural size.
pub struct BaseReencodeTier {
    compositor: Arc<FrameCompositor>,
}

impl BaseReencodeTier {
    pub fn new(compositor: Arc<FrameCompositor>) -> Self {
        Self { compositor }
    }
}

#[async_trait]
impl CaptureTier for BaseReencodeTier {
    fn kind(&self) -> CaptureTierKind {
        CaptureTierKind::BaseReencode
    }

    async fn capture(&self, request: &CaptureRequest<'_>) -> Result<FrameRGBA, CaptureError> {
        self.compositor
            .reencode_base(request.frame, None)
            .await?
            .ok_or(CaptureError::Empty)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/tiers.rs"]
mod tests;
