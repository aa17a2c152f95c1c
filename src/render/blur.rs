use crate::foundation::error::{StoryframeError, StoryframeResult};

/// Largest CSS blur radius honored; wider blurs are indistinguishable from transparent.
pub(crate) const MAX_CSS_BLUR_PX: f64 = 256.0;

/// Gaussian sigma for a CSS blur radius (`text-shadow`, `drop-shadow`).
pub(crate) fn sigma_for_css_blur(blur_px: f64) -> f32 {
    if blur_px.is_nan() {
        return 0.0;
    }
    (blur_px.clamp(0.0, MAX_CSS_BLUR_PX) / 2.0) as f32
}

/// Kernel half-width covering three sigmas.
pub(crate) fn kernel_radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Separable gaussian blur over a premultiplied RGBA8 buffer.
pub(crate) fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> StoryframeResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| StoryframeError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(StoryframeError::render(
            "blur_rgba8_premul buffer size mismatch",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }
    // Taps past the far edge only ever read transparent pixels.
    let radius = radius.min(width.max(height));

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; src.len()];
    let mut out = vec![0u8; src.len()];
    horizontal_blur_q16(src, &mut tmp, width, height, &kernel);
    vertical_blur_q16(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Blur for a CSS blur radius; zero blur returns the input unchanged.
pub(crate) fn blur_css(src: &[u8], width: u32, height: u32, blur_px: f64) -> StoryframeResult<Vec<u8>> {
    let sigma = sigma_for_css_blur(blur_px);
    blur_rgba8_premul(src, width, height, kernel_radius_for_sigma(sigma), sigma)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> StoryframeResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StoryframeError::validation(
            "blur sigma must be finite and > 0",
        ));
    }

    let r = i32::try_from(radius)
        .ok()
        .filter(|r| r.checked_mul(2).and_then(|d| d.checked_add(1)).is_some())
        .ok_or_else(|| StoryframeError::validation("blur radius out of range"))?;
    let mut weights_f = Vec::<f64>::with_capacity(radius as usize * 2 + 1);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(StoryframeError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

// Edges are transparent, not clamped: a glyph near the layer border must fade out, not smear.
fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        let row = (y * w) as usize;
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i32 - radius;
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = (row + sx as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = (row + x as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i32 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
