use crate::foundation::core::{Point, Size};
use crate::scene::model::BoundingBox;

/// Largest absolute box value still read as a fraction of the container.
///
/// Values slightly above 1.0 show up from float slop in normalized boxes; a legitimately
/// absolute box whose values all fall under this bound is misread as normalized.
pub const NORMALIZED_THRESHOLD: f64 = 1.05;

/// A bounding box with its unit convention decided once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    /// Fractions of the current container.
    Normalized(BoundingBox),
    /// Pixels relative to the frame's recorded base size.
    Absolute(BoundingBox),
}

/// Box resolved into container pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedBox {
    /// Left edge in pixels.
    pub left: f64,
    /// Top edge in pixels.
    pub top: f64,
    /// Width in pixels, when the box carries one.
    pub width: Option<f64>,
    /// Height in pixels, when the box carries one.
    pub height: Option<f64>,
}

impl ResolvedBox {
    /// Box center. Missing dimensions count as zero, so the position itself is the center.
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width.unwrap_or(0.0) / 2.0,
            self.top + self.height.unwrap_or(0.0) / 2.0,
        )
    }

    /// Width and height, falling back to `natural` for whichever is missing.
    pub fn size_or(&self, natural: (f64, f64)) -> (f64, f64) {
        (
            self.width.unwrap_or(natural.0),
            self.height.unwrap_or(natural.1),
        )
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn sanitize(bbox: &BoundingBox) -> BoundingBox {
    BoundingBox {
        x: finite_or_zero(bbox.x),
        y: finite_or_zero(bbox.y),
        width: bbox.width.filter(|v| v.is_finite()),
        height: bbox.height.filter(|v| v.is_finite()),
    }
}

impl Geometry {
    /// Classify by the largest absolute value across all present box fields.
    pub fn classify(bbox: &BoundingBox) -> Self {
        let bbox = sanitize(bbox);
        let max = [Some(bbox.x), Some(bbox.y), bbox.width, bbox.height]
            .into_iter()
            .flatten()
            .map(f64::abs)
            .fold(0.0_f64, f64::max);
        if max <= NORMALIZED_THRESHOLD {
            Self::Normalized(bbox)
        } else {
            Self::Absolute(bbox)
        }
    }

    /// `true` for the fraction-of-container convention.
    pub fn is_normalized(&self) -> bool {
        matches!(self, Self::Normalized(_))
    }

    /// Underlying box values.
    pub fn bbox(&self) -> &BoundingBox {
        match self {
            Self::Normalized(b) | Self::Absolute(b) => b,
        }
    }

    /// Per-axis multipliers from box units to container pixels.
    ///
    /// A missing recorded size means the box was authored against the container itself.
    pub fn axis_scale(&self, container: Size, recorded: Option<Size>) -> (f64, f64) {
        match self {
            Self::Normalized(_) => (container.w(), container.h()),
            Self::Absolute(_) => {
                let base = recorded.filter(|s| !s.is_empty()).unwrap_or(container);
                (container.w() / base.w(), container.h() / base.h())
            }
        }
    }

    /// Resolve into container pixels. Axes scale independently.
    pub fn resolve(&self, container: Size, recorded: Option<Size>) -> ResolvedBox {
        let (sx, sy) = self.axis_scale(container, recorded);
        let b = self.bbox();
        ResolvedBox {
            left: b.x * sx,
            top: b.y * sy,
            width: b.width.map(|w| w * sx),
            height: b.height.map(|h| h * sy),
        }
    }

    /// Resolve a font size recorded next to this box into pixels.
    ///
    /// Sizes `<= 2` are fractions of the container height. Larger sizes are pixels, rescaled by
    /// the height ratio when the box itself is absolute.
    pub fn resolve_font_size(&self, font_size: f64, container: Size, recorded: Option<Size>) -> f64 {
        if font_size <= 2.0 {
            return font_size * container.h();
        }
        match self {
            Self::Normalized(_) => font_size,
            Self::Absolute(_) => font_size * self.axis_scale(container, recorded).1,
        }
    }
}

/// Classify and resolve in one step.
pub fn resolve(bbox: &BoundingBox, container: Size, recorded: Option<Size>) -> ResolvedBox {
    Geometry::classify(bbox).resolve(container, recorded)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
