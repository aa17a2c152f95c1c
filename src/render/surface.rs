use std::io::Cursor;
use std::sync::Arc;

use crate::assets::decode::{PreparedImage, unpremultiply_rgba8_in_place};
use crate::foundation::core::{Affine, Size};
use crate::foundation::error::{StoryframeError, StoryframeResult};

#[derive(Clone, Debug, PartialEq, Eq)]
/// CPU-side RGBA8 frame.
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent premultiplied frame.
    pub fn transparent(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0u8; (size.width as usize) * (size.height as usize) * 4],
            premultiplied: true,
        }
    }

    /// Wrap raw bytes, checking the length.
    pub fn from_parts(
        width: u32,
        height: u32,
        data: Vec<u8>,
        premultiplied: bool,
    ) -> StoryframeResult<Self> {
        let want = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if data.len() != want || width == 0 || height == 0 {
            return Err(StoryframeError::validation(format!(
                "frame bytes do not match {width}x{height} rgba8"
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied,
        })
    }

    /// Frame dimensions.
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// RGBA8 at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> StoryframeResult<Vec<u8>> {
        let straight = self.to_straight_rgba8();
        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| StoryframeError::render("frame buffer size mismatch"))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| StoryframeError::render(format!("encode png: {e}")))?;
        Ok(buf)
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StoryframeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryframeError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryframeError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StoryframeError::render("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

/// Image paint for a premultiplied buffer.
pub(crate) fn image_paint(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> StoryframeResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn prepared_image_paint(img: &PreparedImage) -> StoryframeResult<vello_cpu::Image> {
    image_paint(&img.rgba8_premul, img.width, img.height)
}

/// Run `draw` against a fresh `width` x `height` context and return the premultiplied pixels.
pub(crate) fn rasterize_layer(
    width: u32,
    height: u32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext) -> StoryframeResult<()>,
) -> StoryframeResult<Vec<u8>> {
    let (w, h) = Size::new(width, height)?.to_u16()?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    draw(&mut ctx)?;
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
