use std::sync::Arc;

use crate::foundation::error::{StoryframeError, StoryframeResult};

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Parsed SVG document.
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

impl PreparedSvg {
    /// Intrinsic size rounded up to whole pixels.
    pub fn natural_size(&self) -> (f64, f64) {
        let s = self.tree.size();
        (
            f64::from(s.width()).ceil().max(1.0),
            f64::from(s.height()).ceil().max(1.0),
        )
    }
}

#[derive(Clone, Debug)]
/// Overlay content after decoding: either pixels or vector art.
pub enum PreparedGraphic {
    /// Raster image.
    Raster(PreparedImage),
    /// Vector logo or icon.
    Svg(PreparedSvg),
}

impl PreparedGraphic {
    /// Natural size in pixels.
    pub fn natural_size(&self) -> (f64, f64) {
        match self {
            Self::Raster(img) => (f64::from(img.width), f64::from(img.height)),
            Self::Svg(svg) => svg.natural_size(),
        }
    }
}

/// Decode any raster format the `image` crate knows into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StoryframeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| StoryframeError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> StoryframeResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| StoryframeError::decode(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Sniff for an SVG document: optional BOM/whitespace, then an XML prolog or `<svg`.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let head = &head[start..];
    if head.starts_with(b"<svg") {
        return true;
    }
    if head.starts_with(b"<?xml") || head.starts_with(b"<!DOCTYPE svg") {
        return head.windows(4).any(|w| w == b"<svg");
    }
    false
}

/// Decode overlay bytes, routing SVG documents to `usvg`.
pub fn decode_graphic(bytes: &[u8]) -> StoryframeResult<PreparedGraphic> {
    if looks_like_svg(bytes) {
        return parse_svg(bytes).map(PreparedGraphic::Svg);
    }
    decode_image(bytes).map(PreparedGraphic::Raster)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = (((*c as u32) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
