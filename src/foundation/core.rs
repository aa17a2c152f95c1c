use crate::foundation::error::{StoryframeError, StoryframeResult};

pub use kurbo::{Affine, Point, Rect};

/// Pixel dimensions of a frame, container or image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> StoryframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(StoryframeError::validation(format!(
                "size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Build a size from floating-point dimensions recorded by an upstream tool.
    ///
    /// Returns `None` unless both values are finite and positive.
    pub fn from_recorded(width: Option<f64>, height: Option<f64>) -> Option<Self> {
        let w = width.filter(|v| v.is_finite() && *v >= 1.0)?;
        let h = height.filter(|v| v.is_finite() && *v >= 1.0)?;
        Some(Self {
            width: w.round() as u32,
            height: h.round() as u32,
        })
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width as `f64`.
    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn h(self) -> f64 {
        f64::from(self.height)
    }

    /// Dimensions narrowed to the `u16` range `vello_cpu` pixmaps use.
    pub(crate) fn to_u16(self) -> StoryframeResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| StoryframeError::render("surface width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| StoryframeError::render("surface height exceeds u16"))?;
        Ok((w, h))
    }
}

/// Output size used when neither the frame nor its base image provides one.
pub const DEFAULT_CANVAS: Size = Size {
    width: 1280,
    height: 720,
};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as an array, in RGBA order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
