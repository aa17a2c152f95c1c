use crate::foundation::error::{StoryframeError, StoryframeResult};
use crate::foundation::math::mul_div255_u8;

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Source-over of equal-size premultiplied buffers, scaling the source by `opacity`.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> StoryframeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StoryframeError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return Ok(());
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        over_px(d, s, op);
    }
    Ok(())
}

#[inline]
fn over_px(d: &mut [u8], s: &[u8], op: u16) {
    let sa = mul_div255_u8(u16::from(s[3]), op);
    if sa == 0 {
        return;
    }
    let inv = 255u16 - u16::from(sa);
    d[3] = add_sat_u8(sa, mul_div255_u8(u16::from(d[3]), inv));
    for c in 0..3 {
        let sc = mul_div255_u8(u16::from(s[c]), op);
        let dc = mul_div255_u8(u16::from(d[c]), inv);
        d[c] = add_sat_u8(sc, dc);
    }
}

/// A premultiplied buffer placed at an integer offset on a larger canvas.
#[derive(Clone, Debug)]
pub(crate) struct PlacedLayer {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<u8>,
}

impl PlacedLayer {
    pub(crate) fn transparent(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }
}

/// Source-over of `layer` onto a `dst_w` x `dst_h` canvas, clipping at the edges.
pub(crate) fn over_placed(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    layer: &PlacedLayer,
    opacity: f32,
) -> StoryframeResult<()> {
    if dst.len() != (dst_w as usize) * (dst_h as usize) * 4
        || layer.data.len() != (layer.width as usize) * (layer.height as usize) * 4
    {
        return Err(StoryframeError::render("over_placed buffer size mismatch"));
    }
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return Ok(());
    }

    let x0 = layer.x.max(0);
    let y0 = layer.y.max(0);
    let x1 = (layer.x + layer.width as i32).min(dst_w as i32);
    let y1 = (layer.y + layer.height as i32).min(dst_h as i32);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let span = ((x1 - x0) as usize) * 4;
    for y in y0..y1 {
        let d_off = ((y as usize) * (dst_w as usize) + x0 as usize) * 4;
        let s_off = (((y - layer.y) as usize) * (layer.width as usize)
            + (x0 - layer.x) as usize)
            * 4;
        let d_row = &mut dst[d_off..d_off + span];
        let s_row = &layer.data[s_off..s_off + span];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            over_px(d, s, op);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
