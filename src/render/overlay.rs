use crate::assets::decode::PreparedGraphic;
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_size};
use crate::foundation::core::{Affine, Size};
use crate::foundation::error::StoryframeResult;
use crate::layout::geometry::resolve;
use crate::render::composite::over_in_place;
use crate::render::surface::{FrameRGBA, affine_to_cpu, image_paint, prepared_image_paint, rasterize_layer};
use crate::scene::model::OverlayElement;

/// Placement of an overlay's source pixels on the canvas.
///
/// Maps the `source_w` x `source_h` image onto the resolved `w` x `h` box, rotating about the
/// box center when `rotation_deg` is non-zero.
pub(crate) fn overlay_transform(
    left: f64,
    top: f64,
    w: f64,
    h: f64,
    rotation_deg: f64,
    source_w: f64,
    source_h: f64,
) -> Affine {
    let scale = Affine::scale_non_uniform(w / source_w, h / source_h);
    if rotation_deg == 0.0 || !rotation_deg.is_finite() {
        return Affine::translate((left, top)) * scale;
    }
    Affine::translate((left + w / 2.0, top + h / 2.0))
        * Affine::rotate(rotation_deg.to_radians())
        * Affine::translate((-w / 2.0, -h / 2.0))
        * scale
}

/// Draw a decoded overlay. Returns `Ok(false)` when the box collapses to nothing.
pub(crate) fn draw_overlay(
    canvas: &mut FrameRGBA,
    element: &OverlayElement,
    graphic: &PreparedGraphic,
    container: Size,
    recorded: Option<Size>,
) -> StoryframeResult<bool> {
    let resolved = resolve(&element.bounding_box, container, recorded);
    let (w, h) = resolved.size_or(graphic.natural_size());
    if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
        return Ok(false);
    }

    let (paint, sw, sh) = match graphic {
        PreparedGraphic::Raster(img) => (
            prepared_image_paint(img)?,
            f64::from(img.width),
            f64::from(img.height),
        ),
        PreparedGraphic::Svg(svg) => {
            let (rw, rh) = svg_raster_size(w, h)?;
            let rgba = rasterize_svg_to_premul_rgba8(&svg.tree, rw, rh)?;
            (image_paint(&rgba, rw, rh)?, f64::from(rw), f64::from(rh))
        }
    };

    let tr = overlay_transform(
        resolved.left,
        resolved.top,
        w,
        h,
        element.rotation,
        sw,
        sh,
    );
    let layer = rasterize_layer(canvas.width, canvas.height, |ctx| {
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, sw, sh));
        Ok(())
    })?;
    over_in_place(&mut canvas.data, &layer, element.opacity_or_default())?;
    Ok(true)
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
