//! Storyframe flattens storyboard frames into stills and ships them in one upload.
//!
//! A frame is a base image plus positioned captions and image overlays. The crate:
//!
//! - Resolves element geometry and stacking order ([`layout`])
//! - Composites a frame on the CPU ([`FrameCompositor`])
//! - Captures every (scene, image) pair through a tiered fallback ([`CaptureResolver`])
//! - Packages the rendered binaries with their narrative roles and uploads them
//!   ([`ExportSession`])
#![forbid(unsafe_code)]

mod foundation;

/// Image, SVG and font loading.
pub mod assets;
/// Capture tiers and the fallback resolver.
pub mod capture;
/// Export configuration.
pub mod config;
/// Render sweep, cache, packaging and upload.
pub mod export;
/// Geometry resolution and element layering.
pub mod layout;
/// CPU compositing.
pub mod render;
/// Storyboard input model.
pub mod scene;

pub use crate::foundation::core::{DEFAULT_CANVAS, Rgba8Premul, Size};
pub use crate::foundation::error::{StoryframeError, StoryframeResult};

pub use crate::assets::{
    BackgroundRemover, CACHE_BUST_PARAM, FontBook, HttpBackgroundRemover, HttpImageLoader,
    ImageLoader, MemoryImageLoader, PassthroughBackgroundRemover, cache_bust,
};
pub use crate::capture::{
    CaptureOptions, CaptureResolver, CaptureTier, CaptureTierKind, LivePresentation,
};
pub use crate::config::ExportConfig;
pub use crate::export::{
    ExportOutcome, ExportSession, FrameMetadataEntry, FrameRole, HttpJobTrigger, HttpUploader,
    JobTrigger, RenderedAssetCache, RoleRule, SweepReport, UploadAck, UploadPackage, Uploader,
};
pub use crate::render::{CompositeOptions, FrameCompositor, FrameRGBA};
pub use crate::scene::{Frame, OverlayElement, Scene, Storyboard, TextElement};
