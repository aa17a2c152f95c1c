use std::sync::{Arc, Mutex};

use crate::assets::decode::{PreparedGraphic, PreparedImage, decode_graphic, decode_image};
use crate::assets::fonts::FontBook;
use crate::assets::loader::{
    BackgroundRemover, ImageLoader, PassthroughBackgroundRemover, cache_bust,
    remove_background_or_original,
};
use crate::foundation::core::{Affine, DEFAULT_CANVAS, Size};
use crate::foundation::error::{StoryframeError, StoryframeResult};
use crate::layout::layering::{DrawItem, layer};
use crate::render::overlay::draw_overlay;
use crate::render::surface::{FrameRGBA, affine_to_cpu, prepared_image_paint, rasterize_layer};
use crate::render::text::TextRenderer;
use crate::scene::model::{Frame, OverlayElement, TextElement};

/// Which element groups to bake into a composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeOptions {
    /// Draw captions.
    pub include_text: bool,
    /// Draw overlays.
    pub include_overlays: bool,
}

impl CompositeOptions {
    /// Overlays without captions, as exported stills are produced.
    pub const EXPORT: Self = Self {
        include_text: false,
        include_overlays: true,
    };

    /// Everything.
    pub const ALL: Self = Self {
        include_text: true,
        include_overlays: true,
    };
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self::ALL
    }
}

/// Flattens a [`Frame`] into a single raster.
///
/// Loading is async and happens first; drawing is synchronous and only starts once every image
/// the frame needs is in memory.
pub struct FrameCompositor {
    loader: Arc<dyn ImageLoader>,
    remover: Arc<dyn BackgroundRemover>,
    fonts: Arc<FontBook>,
    text: Mutex<TextRenderer>,
    default_canvas: Size,
    cache_bust_token: Option<String>,
}

impl FrameCompositor {
    pub fn new(loader: Arc<dyn ImageLoader>, fonts: Arc<FontBook>) -> Self {
        Self {
            loader,
            remover: Arc::new(PassthroughBackgroundRemover),
            fonts,
            text: Mutex::new(TextRenderer::new()),
            default_canvas: DEFAULT_CANVAS,
            cache_bust_token: None,
        }
    }

    /// Route overlays without `background_removed` through `remover` first.
    pub fn with_background_remover(mut self, remover: Arc<dyn BackgroundRemover>) -> Self {
        self.remover = remover;
        self
    }

    /// Append `sf_cb=<token>` to remote overlay URLs.
    pub fn with_cache_bust(mut self, token: impl Into<String>) -> Self {
        self.cache_bust_token = Some(token.into());
        self
    }

    /// Canvas used when neither the frame nor its base image provides a size.
    pub fn with_default_canvas(mut self, size: Size) -> Self {
        self.default_canvas = size;
        self
    }

    /// Loader the compositor reads images through.
    pub fn loader(&self) -> &Arc<dyn ImageLoader> {
        &self.loader
    }

    async fn load_base(&self, frame: &Frame) -> Option<PreparedImage> {
        let Some(reference) = frame.base_image_ref() else {
            tracing::warn!("frame has no base image reference");
            return None;
        };
        let bytes = match self.loader.load(reference).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(base = reference, error = %e, "base image load failed");
                return None;
            }
        };
        match decode_image(&bytes) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(base = reference, error = %e, "base image decode failed");
                None
            }
        }
    }

    async fn load_overlay(&self, index: usize, element: &OverlayElement) -> Option<PreparedGraphic> {
        let Some(reference) = element.image_ref() else {
            tracing::warn!(overlay = index, "overlay has no image reference; skipping");
            return None;
        };
        let mut url = if element.background_removed {
            reference.to_string()
        } else {
            remove_background_or_original(self.remover.as_ref(), reference).await
        };
        if let Some(token) = &self.cache_bust_token {
            url = cache_bust(&url, token);
        }
        let loaded = match self.loader.load(&url).await {
            Ok(bytes) => decode_graphic(&bytes),
            Err(e) => Err(e),
        };
        match loaded {
            Ok(g) => Some(g),
            Err(e) => {
                tracing::warn!(overlay = index, url = %url, error = %e, "overlay skipped");
                None
            }
        }
    }

    fn canvas_size(&self, frame: &Frame, base: &PreparedImage, fallback: Option<Size>) -> Size {
        frame
            .recorded_size()
            .or_else(|| Size::new(base.width, base.height).ok())
            .or(fallback)
            .unwrap_or(self.default_canvas)
    }

    /// Composite `frame`. `Ok(None)` means the base image could not be loaded.
    #[tracing::instrument(level = "debug", skip(self, frame), fields(base = frame.base_image_ref().unwrap_or("")))]
    pub async fn composite_frame(
        &self,
        frame: &Frame,
        fallback: Option<Size>,
        options: CompositeOptions,
    ) -> StoryframeResult<Option<FrameRGBA>> {
        let Some(base) = self.load_base(frame).await else {
            return Ok(None);
        };

        let mut overlays: Vec<Option<PreparedGraphic>> = Vec::new();
        if options.include_overlays {
            for (index, element) in frame.overlay_elements.iter().enumerate() {
                overlays.push(self.load_overlay(index, element).await);
            }
        }

        let size = self.canvas_size(frame, &base, fallback);
        let mut canvas = draw_base(&base, size)?;

        let texts: &[TextElement] = if options.include_text {
            frame.text_elements.as_slice()
        } else {
            &[]
        };
        let overlay_elements: &[OverlayElement] = if options.include_overlays {
            frame.overlay_elements.as_slice()
        } else {
            &[]
        };

        let mut text = self
            .text
            .lock()
            .map_err(|_| StoryframeError::render("text renderer lock poisoned"))?;
        for item in layer(texts, overlay_elements) {
            match item.item {
                DrawItem::Text { index, element } => {
                    if let Err(e) =
                        text.draw_text(&mut canvas, element, size, Some(size), &self.fonts)
                    {
                        tracing::warn!(text = index, error = %e, "text element skipped");
                    }
                }
                DrawItem::Overlay { index, element } => {
                    let Some(graphic) = overlays.get(index).and_then(Option::as_ref) else {
                        continue;
                    };
                    if let Err(e) = draw_overlay(&mut canvas, element, graphic, size, Some(size)) {
                        tracing::warn!(overlay = index, error = %e, "overlay element skipped");
                    }
                }
            }
        }
        Ok(Some(canvas))
    }

    /// Base image alone at recorded-or-natural size.
    #[tracing::instrument(level = "debug", skip(self, frame), fields(base = frame.base_image_ref().unwrap_or("")))]
    pub async fn reencode_base(
        &self,
        frame: &Frame,
        fallback: Option<Size>,
    ) -> StoryframeResult<Option<FrameRGBA>> {
        let Some(base) = self.load_base(frame).await else {
            return Ok(None);
        };
        let size = self.canvas_size(frame, &base, fallback);
        draw_base(&base, size).map(Some)
    }
}

/// Stretch the base image over a `size` canvas.
pub(crate) fn draw_base(base: &PreparedImage, size: Size) -> StoryframeResult<FrameRGBA> {
    if base.width == size.width && base.height == size.height {
        return FrameRGBA::from_parts(size.width, size.height, base.rgba8_premul.to_vec(), true);
    }
    let paint = prepared_image_paint(base)?;
    let (iw, ih) = (f64::from(base.width), f64::from(base.height));
    let tr = Affine::scale_non_uniform(size.w() / iw, size.h() / ih);
    let data = rasterize_layer(size.width, size.height, |ctx| {
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        Ok(())
    })?;
    FrameRGBA::from_parts(size.width, size.height, data, true)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
