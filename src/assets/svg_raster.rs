use crate::foundation::error::{StoryframeError, StoryframeResult};

const MAX_DIM: u32 = 16_384;

/// Pixel size to rasterize an SVG at so it lands on a `draw_w` x `draw_h` box without upscaling.
pub fn svg_raster_size(draw_w: f64, draw_h: f64) -> StoryframeResult<(u32, u32)> {
    fn to_px(v: f64) -> StoryframeResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(StoryframeError::render("svg draw size must be finite and > 0"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let w = to_px(draw_w)?;
    let h = to_px(draw_h)?;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(StoryframeError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

/// Render the whole SVG viewport stretched into a `width` x `height` premultiplied RGBA8 buffer.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StoryframeResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StoryframeError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
