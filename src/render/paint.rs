//! Fixed paint recipes for caption effects, applied to glyph coverage masks.
//!
//! Glyphs are rasterized once as an A8 coverage mask; every effect (fill, gradient, outline,
//! shadow, glow, 3d copies) is a tint of that mask, optionally shifted, dilated or blurred.

use crate::foundation::core::Rect;
use crate::foundation::math::{lerp_u8, mul_div255_u8, unit_to_u8_scale};
use crate::scene::color::{ColorDef, hsla_to_rgba};
use crate::scene::model::{FillStyle, GlowTier};

/// One soft-shadow pass of a glow tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GlowPass {
    /// CSS blur radius in pixels.
    pub(crate) blur_px: f64,
    /// Alpha multiplier applied to the glow color.
    pub(crate) alpha: f64,
}

const fn pass(blur_px: f64, alpha: f64) -> GlowPass {
    GlowPass { blur_px, alpha }
}

const SUBTLE: [GlowPass; 1] = [pass(4.0, 0.6)];
const MEDIUM: [GlowPass; 2] = [pass(6.0, 0.7), pass(12.0, 0.45)];
const STRONG: [GlowPass; 3] = [pass(8.0, 0.9), pass(16.0, 0.65), pass(28.0, 0.4)];
const NEON: [GlowPass; 3] = [pass(4.0, 1.0), pass(10.0, 0.9), pass(20.0, 0.8)];

pub(crate) fn glow_recipe(tier: GlowTier) -> &'static [GlowPass] {
    match tier {
        GlowTier::Subtle => &SUBTLE,
        GlowTier::Medium => &MEDIUM,
        GlowTier::Strong => &STRONG,
        GlowTier::Neon => &NEON,
    }
}

/// Chip padding as a fraction of the font size.
pub(crate) const CHIP_PAD_EM: f64 = 0.25;

pub(crate) fn outline_width(font_px: f64) -> f64 {
    (font_px / 24.0).max(1.0)
}

/// Offset (px, both axes) and darken amount of each extrusion copy, nearest first.
pub(crate) fn three_d_layers(font_px: f64) -> [(f64, f64); 2] {
    let step = font_px / 24.0;
    [(step, 0.35), (2.0 * step, 0.55)]
}

/// Straight-alpha source for tinting coverage.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FillPaint {
    Solid([u8; 4]),
    Linear {
        start: (f64, f64),
        end: (f64, f64),
        stops: Vec<(f64, [u8; 4])>,
    },
}

impl FillPaint {
    /// Color at canvas position `(x, y)`.
    pub(crate) fn color_at(&self, x: f64, y: f64) -> [u8; 4] {
        match self {
            Self::Solid(c) => *c,
            Self::Linear { start, end, stops } => {
                let (dx, dy) = (end.0 - start.0, end.1 - start.1);
                let len2 = dx * dx + dy * dy;
                let t = if len2 <= f64::EPSILON {
                    0.0
                } else {
                    (((x - start.0) * dx + (y - start.1) * dy) / len2).clamp(0.0, 1.0)
                };
                sample_stops(stops, t)
            }
        }
    }
}

fn sample_stops(stops: &[(f64, [u8; 4])], t: f64) -> [u8; 4] {
    let Some(first) = stops.first() else {
        return [0, 0, 0, 0];
    };
    if t <= first.0 {
        return first.1;
    }
    for w in stops.windows(2) {
        let (t0, c0) = w[0];
        let (t1, c1) = w[1];
        if t <= t1 {
            let span = t1 - t0;
            let k = if span <= f64::EPSILON {
                1.0
            } else {
                ((t - t0) / span) as f32
            };
            return [
                lerp_u8(c0[0], c1[0], k),
                lerp_u8(c0[1], c1[1], k),
                lerp_u8(c0[2], c1[2], k),
                lerp_u8(c0[3], c1[3], k),
            ];
        }
    }
    stops[stops.len() - 1].1
}

/// CSS `linear-gradient(<angle>deg, ...)` laid over `rect`.
pub(crate) fn css_linear_gradient(rect: Rect, angle_deg: f64, stops: Vec<(f64, [u8; 4])>) -> FillPaint {
    let theta = angle_deg.to_radians();
    let dir = (theta.sin(), -theta.cos());
    let half = (rect.width().abs() * dir.0.abs() + rect.height().abs() * dir.1.abs()) / 2.0;
    let c = rect.center();
    FillPaint::Linear {
        start: (c.x - dir.0 * half, c.y - dir.1 * half),
        end: (c.x + dir.0 * half, c.y + dir.1 * half),
        stops,
    }
}

fn hex(rgb: u32) -> [u8; 4] {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255]
}

/// Paint for the glyph body. `content` is the text's content rect on the canvas.
pub(crate) fn fill_paint(style: Option<FillStyle>, color: ColorDef, content: Rect) -> FillPaint {
    match style {
        Some(FillStyle::Gradient) => {
            css_linear_gradient(content, 135.0, vec![(0.0, hex(0x667eea)), (1.0, hex(0x764ba2))])
        }
        Some(FillStyle::Metallic) => css_linear_gradient(
            content,
            180.0,
            vec![
                (0.0, hex(0xf5f5f5)),
                (0.45, hex(0xc0c0c0)),
                (0.5, hex(0xe8e8e8)),
                (1.0, hex(0x8a8a8a)),
            ],
        ),
        Some(FillStyle::GradientRainbow) => {
            let stops = (0..=6)
                .map(|i| {
                    let t = f64::from(i) / 6.0;
                    (t, hsla_to_rgba(t * 360.0, 1.0, 0.5, 1.0).to_rgba8())
                })
                .collect();
            css_linear_gradient(content, 90.0, stops)
        }
        Some(FillStyle::Outline) | Some(FillStyle::ThreeD) | None => {
            FillPaint::Solid(color.to_rgba8())
        }
    }
}

/// Tint a coverage mask into premultiplied RGBA8. `origin` is the canvas position of the mask's
/// top-left pixel.
pub(crate) fn tint_coverage(
    coverage: &[u8],
    width: u32,
    origin: (i32, i32),
    paint: &FillPaint,
    alpha_mul: f64,
) -> Vec<u8> {
    let mut out = vec![0u8; coverage.len() * 4];
    let am = unit_to_u8_scale(alpha_mul as f32);
    if am == 0 || width == 0 {
        return out;
    }
    for (i, (&cov, px)) in coverage.iter().zip(out.chunks_exact_mut(4)).enumerate() {
        if cov == 0 {
            continue;
        }
        let x = origin.0 as f64 + (i as u32 % width) as f64 + 0.5;
        let y = origin.1 as f64 + (i as u32 / width) as f64 + 0.5;
        let [r, g, b, a] = paint.color_at(x, y);
        let a = mul_div255_u8(u16::from(mul_div255_u8(u16::from(a), u16::from(cov))), am);
        px[0] = mul_div255_u8(u16::from(r), u16::from(a));
        px[1] = mul_div255_u8(u16::from(g), u16::from(a));
        px[2] = mul_div255_u8(u16::from(b), u16::from(a));
        px[3] = a;
    }
    out
}

/// Move a coverage mask by whole pixels; uncovered area becomes zero.
pub(crate) fn shift_coverage(coverage: &[u8], width: u32, height: u32, dx: i32, dy: i32) -> Vec<u8> {
    let mut out = vec![0u8; coverage.len()];
    if dx.unsigned_abs() >= width || dy.unsigned_abs() >= height {
        return out;
    }
    let (w, h) = (i64::from(width), i64::from(height));
    let (dx, dy) = (i64::from(dx), i64::from(dy));
    for y in 0..h {
        let sy = y - dy;
        if sy < 0 || sy >= h {
            continue;
        }
        for x in 0..w {
            let sx = x - dx;
            if sx < 0 || sx >= w {
                continue;
            }
            out[(y * w + x) as usize] = coverage[(sy * w + sx) as usize];
        }
    }
    out
}

fn morph(coverage: &[u8], width: u32, height: u32, radius: u32, grow: bool) -> Vec<u8> {
    let pick = |a: u8, b: u8| if grow { a.max(b) } else { a.min(b) };
    // A radius past the layer size reaches nothing more.
    let r = radius.min(width.max(height)) as i32;
    let (w, h) = (width as i32, height as i32);
    let mut tmp = vec![0u8; coverage.len()];
    for y in 0..h {
        for x in 0..w {
            let mut v = coverage[(y * w + x) as usize];
            for dx in -r..=r {
                let sx = x + dx;
                let s = if sx < 0 || sx >= w {
                    0
                } else {
                    coverage[(y * w + sx) as usize]
                };
                v = pick(v, s);
            }
            tmp[(y * w + x) as usize] = v;
        }
    }
    let mut out = vec![0u8; coverage.len()];
    for y in 0..h {
        for x in 0..w {
            let mut v = tmp[(y * w + x) as usize];
            for dy in -r..=r {
                let sy = y + dy;
                let s = if sy < 0 || sy >= h {
                    0
                } else {
                    tmp[(sy * w + x) as usize]
                };
                v = pick(v, s);
            }
            out[(y * w + x) as usize] = v;
        }
    }
    out
}

/// Stroke-only coverage: the band between the mask grown and shrunk by half the stroke width.
pub(crate) fn outline_coverage(coverage: &[u8], width: u32, height: u32, stroke_px: f64) -> Vec<u8> {
    let half = (stroke_px / 2.0).ceil().max(1.0) as u32;
    let outer = morph(coverage, width, height, half, true);
    let inner = morph(coverage, width, height, half, false);
    outer
        .iter()
        .zip(&inner)
        .map(|(&o, &i)| o.saturating_sub(i))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
