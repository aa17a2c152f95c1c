use std::collections::HashMap;

use crate::assets::fonts::{FontBook, LineStyle, ResolvedFont, TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, Rect, Rgba8Premul, Size};
use crate::foundation::error::{StoryframeError, StoryframeResult};
use crate::layout::geometry::{Geometry, ResolvedBox};
use crate::render::blur::{MAX_CSS_BLUR_PX, blur_css};
use crate::render::composite::{PlacedLayer, over_in_place, over_placed};
use crate::render::paint::{
    CHIP_PAD_EM, FillPaint, fill_paint, glow_recipe, outline_coverage, outline_width,
    shift_coverage, three_d_layers, tint_coverage,
};
use crate::render::surface::{FrameRGBA, affine_to_cpu, rasterize_layer};
use crate::scene::model::{Anchor, FillStyle, FontStyle, TextAlign, TextElement};

/// Where one line of a caption lands on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedLine {
    /// Index of the line in the split text.
    pub index: usize,
    /// Left edge of the line in pixels.
    pub x: f64,
    /// Top of the line box in pixels.
    pub top: f64,
    /// Measured advance width.
    pub width: f64,
}

/// Line placement for one caption, before any glyph is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPlan {
    /// Resolved font size in pixels.
    pub font_px: f64,
    /// Distance between consecutive line tops (`font_px * line_height`).
    pub line_advance: f64,
    /// One entry per `\n`-separated line.
    pub lines: Vec<PlannedLine>,
    /// Union of the placed line boxes.
    pub content: Rect,
}

/// Place measured lines inside a resolved box.
///
/// `top_left` anchors at the box position; `center` puts the content center on the box center,
/// using the measured size for any dimension the box omits. Alignment only applies when the box
/// has a width.
pub fn plan_text(
    resolved: &ResolvedBox,
    anchor: Anchor,
    align: TextAlign,
    font_px: f64,
    line_height: f64,
    line_widths: &[f64],
) -> TextPlan {
    let advance = font_px * line_height;
    let measured_w = line_widths.iter().copied().fold(0.0, f64::max);
    let measured_h = advance * line_widths.len() as f64;

    let (origin_x, origin_y) = match anchor {
        Anchor::TopLeft => (resolved.left, resolved.top),
        Anchor::Center => {
            let (cw, ch) = resolved.size_or((measured_w, measured_h));
            let c = resolved.center();
            (c.x - cw / 2.0, c.y - ch / 2.0)
        }
    };

    let lines: Vec<PlannedLine> = line_widths
        .iter()
        .enumerate()
        .map(|(index, &width)| {
            let dx = match (resolved.width, align) {
                (Some(bw), TextAlign::Center) => (bw - width) / 2.0,
                (Some(bw), TextAlign::Right | TextAlign::End) => bw - width,
                _ => 0.0,
            };
            PlannedLine {
                index,
                x: origin_x + dx,
                top: origin_y + index as f64 * advance,
                width,
            }
        })
        .collect();

    let x0 = lines.iter().map(|l| l.x).fold(origin_x, f64::min);
    let x1 = lines.iter().map(|l| l.x + l.width).fold(origin_x, f64::max);
    TextPlan {
        font_px,
        line_advance: advance,
        content: Rect::new(x0, origin_y, x1, origin_y + measured_h),
        lines,
    }
}

struct ShapedLine {
    layout: parley::Layout<TextBrushRgba8>,
    height: f64,
}

/// Rasterizes captions with their effects onto a frame.
pub(crate) struct TextRenderer {
    engine: TextLayoutEngine,
    font_data: HashMap<String, vello_cpu::peniko::FontData>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer {
    pub(crate) fn new() -> Self {
        Self {
            engine: TextLayoutEngine::new(),
            font_data: HashMap::new(),
        }
    }

    fn font_data_for(&mut self, font: &ResolvedFont) -> vello_cpu::peniko::FontData {
        self.font_data
            .entry(font.key.clone())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.bytes.to_vec()),
                    0,
                )
            })
            .clone()
    }

    /// Draw one caption. Returns `Ok(false)` when nothing lands on the canvas.
    pub(crate) fn draw_text(
        &mut self,
        canvas: &mut FrameRGBA,
        element: &TextElement,
        container: Size,
        recorded: Option<Size>,
        fonts: &FontBook,
    ) -> StoryframeResult<bool> {
        if element.text.trim().is_empty() {
            return Ok(false);
        }
        let font = fonts.resolve(element.font_family.as_deref()).ok_or_else(|| {
            StoryframeError::render(format!(
                "no font available for family {:?}",
                element.font_family
            ))
        })?;

        let geometry = Geometry::classify(&element.bounding_box);
        let resolved = geometry.resolve(container, recorded);
        let font_px = geometry.resolve_font_size(element.font_size_or_default(), container, recorded);
        if !font_px.is_finite() || font_px <= 0.0 {
            return Err(StoryframeError::render("resolved font size is not positive"));
        }

        let style = LineStyle {
            size_px: font_px as f32,
            weight: element.font_weight.0,
            italic: element.font_style == FontStyle::Italic,
            letter_spacing_px: element.letter_spacing as f32,
        };
        let mut shaped = Vec::new();
        for line in element.text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let layout = self.engine.layout_line(line, &font, style)?;
            shaped.push(ShapedLine {
                height: f64::from(layout.height()),
                layout,
            });
        }
        let widths: Vec<f64> = shaped
            .iter()
            .map(|s| f64::from(s.layout.width()))
            .collect();
        let plan = plan_text(
            &resolved,
            element.anchor,
            element.align,
            font_px,
            element.line_height_or_default(),
            &widths,
        );

        let margin = effect_margin(element, font_px);
        let canvas_rect = Rect::new(0.0, 0.0, canvas.width as f64, canvas.height as f64);
        let region = plan.content.inflate(margin, margin).intersect(canvas_rect);
        let lx = region.x0.floor() as i32;
        let ly = region.y0.floor() as i32;
        let lw = (region.x1.ceil() as i32 - lx).max(0) as u32;
        let lh = (region.y1.ceil() as i32 - ly).max(0) as u32;
        if lw == 0 || lh == 0 {
            return Ok(false);
        }

        let font_data = self.font_data_for(&font);
        let coverage_rgba = rasterize_layer(lw, lh, |ctx| {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            for (placed, line) in plan.lines.iter().zip(&shaped) {
                // Center the shaped line box inside the caption's line advance.
                let top = placed.top + (plan.line_advance - line.height) / 2.0;
                let tr = Affine::translate((placed.x - f64::from(lx), top - f64::from(ly)));
                ctx.set_transform(affine_to_cpu(tr));
                for l in line.layout.lines() {
                    for item in l.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&font_data)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }
            Ok(())
        })?;
        let coverage: Vec<u8> = coverage_rgba.chunks_exact(4).map(|px| px[3]).collect();

        let mut layer = PlacedLayer::transparent(lx, ly, lw, lh);
        paint_effects(&mut layer, &coverage, element, &plan)?;
        over_placed(
            &mut canvas.data,
            canvas.width,
            canvas.height,
            &layer,
            element.opacity_or_default(),
        )?;
        Ok(true)
    }
}

/// How far effects can reach past the content rect.
fn effect_margin(element: &TextElement, font_px: f64) -> f64 {
    let mut reach = font_px * CHIP_PAD_EM;
    if let Some(tier) = element.glow {
        for p in glow_recipe(tier) {
            reach = reach.max(p.blur_px * 1.5 + 1.0);
        }
    }
    if let Some(sh) = element.shadow.as_ref().filter(|s| s.enabled) {
        let offset = f64::from(shadow_offset(sh.offset_x, u32::MAX).unsigned_abs())
            .max(f64::from(shadow_offset(sh.offset_y, u32::MAX).unsigned_abs()));
        let blur = if sh.blur.is_nan() { 0.0 } else { sh.blur.clamp(0.0, MAX_CSS_BLUR_PX) };
        reach = reach.max(offset + blur * 1.5 + 1.0);
    }
    match element.fill_style {
        Some(FillStyle::ThreeD) => reach = reach.max(three_d_layers(font_px)[1].0 + 1.0),
        Some(FillStyle::Outline) => reach = reach.max(outline_width(font_px)),
        _ => {}
    }
    // Glyph ink can overshoot the line box.
    reach + font_px * 0.5 + 2.0
}

/// Whole-pixel shadow offset, clamped to `limit`; non-finite input means no offset.
pub(crate) fn shadow_offset(v: f64, limit: u32) -> i32 {
    if !v.is_finite() {
        return 0;
    }
    let limit = f64::from(limit.min(i32::MAX as u32));
    v.round().clamp(-limit, limit) as i32
}

/// Chip, glow, shadow, extrusion, then the glyph body, bottom-up.
fn paint_effects(
    layer: &mut PlacedLayer,
    coverage: &[u8],
    element: &TextElement,
    plan: &TextPlan,
) -> StoryframeResult<()> {
    let (w, h) = (layer.width, layer.height);
    let origin = (layer.x, layer.y);

    if let Some(bg) = element.background_color {
        let pad = plan.font_px * CHIP_PAD_EM;
        fill_rect_premul(layer, plan.content.inflate(pad, pad), bg.to_rgba8());
    }

    if let Some(tier) = element.glow {
        let glow = FillPaint::Solid(element.glow_color.unwrap_or(element.color).to_rgba8());
        for p in glow_recipe(tier) {
            let tinted = tint_coverage(coverage, w, origin, &glow, p.alpha);
            let blurred = blur_css(&tinted, w, h, p.blur_px)?;
            over_in_place(&mut layer.data, &blurred, 1.0)?;
        }
    }

    if let Some(sh) = element.shadow.as_ref().filter(|s| s.enabled) {
        let shifted = shift_coverage(
            coverage,
            w,
            h,
            shadow_offset(sh.offset_x, w),
            shadow_offset(sh.offset_y, h),
        );
        let tinted = tint_coverage(&shifted, w, origin, &FillPaint::Solid(sh.color.to_rgba8()), 1.0);
        let blurred = blur_css(&tinted, w, h, sh.blur)?;
        over_in_place(&mut layer.data, &blurred, 1.0)?;
    }

    if element.fill_style == Some(FillStyle::ThreeD) {
        for (offset, darken) in three_d_layers(plan.font_px).iter().rev() {
            let d = (offset.round() as i32).max(1);
            let shifted = shift_coverage(coverage, w, h, d, d);
            let paint = FillPaint::Solid(element.color.darken(*darken).to_rgba8());
            over_in_place(&mut layer.data, &tint_coverage(&shifted, w, origin, &paint, 1.0), 1.0)?;
        }
    }

    let paint = fill_paint(element.fill_style, element.color, plan.content);
    let body = if element.fill_style == Some(FillStyle::Outline) {
        let ring = outline_coverage(coverage, w, h, outline_width(plan.font_px));
        tint_coverage(&ring, w, origin, &paint, 1.0)
    } else {
        tint_coverage(coverage, w, origin, &paint, 1.0)
    };
    over_in_place(&mut layer.data, &body, 1.0)
}

// Chip is painted first, onto a transparent layer.
fn fill_rect_premul(layer: &mut PlacedLayer, rect: Rect, straight: [u8; 4]) {
    let x0 = ((rect.x0.round() as i32) - layer.x).clamp(0, layer.width as i32) as usize;
    let x1 = ((rect.x1.round() as i32) - layer.x).clamp(0, layer.width as i32) as usize;
    let y0 = ((rect.y0.round() as i32) - layer.y).clamp(0, layer.height as i32) as usize;
    let y1 = ((rect.y1.round() as i32) - layer.y).clamp(0, layer.height as i32) as usize;
    let src = Rgba8Premul::from_straight_rgba(
        straight[0],
        straight[1],
        straight[2],
        straight[3],
    )
    .to_array();
    let stride = layer.width as usize;
    for y in y0..y1 {
        for x in x0..x1 {
            let i = (y * stride + x) * 4;
            layer.data[i..i + 4].copy_from_slice(&src);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
