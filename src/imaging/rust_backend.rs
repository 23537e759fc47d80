//! Pure Rust pixel backend: every primitive, no system libraries.
//!
//! ## Primitive mapping
//!
//! | Primitive | Implementation |
//! |---|---|
//! | Sepia | sepia matrix blended by intensity ([`calculations::sepia`]) |
//! | Invert | `255 - c` per colour channel |
//! | Vignette | quadratic radial falloff ([`calculations::vignette_factor`]) |
//! | Hue rotate | RGB → HSV → RGB ([`calculations::rotate_hue`]) |
//! | Posterize | per-channel quantisation |
//! | Noir | Rec. 709 luma through an S-curve |
//! | Zoom blur | radial average of bilinear samples toward the centre |
//! | Crop | `image::imageops::crop_imm` |
//!
//! Alpha is carried through unchanged by every colour primitive.

use super::backend::{BackendError, FilterBackend};
use super::calculations::{self, MAX_ZOOM_BLUR_AMOUNT};
use super::params::{CropRect, HueAngle, Intensity, Levels};
use super::pixel_image::PixelImage;
use crate::operation::OperationKind;
use image::{Rgba, RgbaImage};

/// Software backend built on the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn to_unit(c: u8) -> f64 {
    c as f64 / 255.0
}

fn from_unit(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Rebuild an image from a per-pixel colour function working in `0.0..=1.0`.
fn map_colour(
    input: &PixelImage,
    mut f: impl FnMut(u32, u32, [f64; 3]) -> [f64; 3],
) -> Result<PixelImage, BackendError> {
    let src = input.as_rgba();
    let out = RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b, a] = src.get_pixel(x, y).0;
        let [r, g, b] = f(x, y, [to_unit(r), to_unit(g), to_unit(b)]);
        Rgba([from_unit(r), from_unit(g), from_unit(b), a])
    });
    wrap(out)
}

fn wrap(pixels: RgbaImage) -> Result<PixelImage, BackendError> {
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(BackendError::EmptyOutput { width, height });
    }
    PixelImage::from_rgba(pixels).map_err(|e| BackendError::ProcessingFailed(e.to_string()))
}

/// Bilinear sample at continuous pixel coordinates, clamped to the edges.
fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> [f64; 4] {
    let max_x = (src.width() - 1) as f64;
    let max_y = (src.height() - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let tx = x - x0 as f64;
    let ty = y - y0 as f64;

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0.0; 4];
    for c in 0..4 {
        let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
        let bottom = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
        out[c] = top * (1.0 - ty) + bottom * ty;
    }
    out
}

impl FilterBackend for RustBackend {
    fn supports(&self, _kind: OperationKind) -> bool {
        true
    }

    fn sepia(&self, input: &PixelImage, intensity: Intensity) -> Result<PixelImage, BackendError> {
        let t = intensity.value();
        map_colour(input, |_, _, rgb| calculations::sepia(rgb, t))
    }

    fn invert(&self, input: &PixelImage) -> Result<PixelImage, BackendError> {
        // Integer arithmetic keeps invert exactly self-inverse
        let src = input.as_rgba();
        let out = RgbaImage::from_fn(src.width(), src.height(), |x, y| {
            let [r, g, b, a] = src.get_pixel(x, y).0;
            Rgba([255 - r, 255 - g, 255 - b, a])
        });
        wrap(out)
    }

    fn vignette(
        &self,
        input: &PixelImage,
        intensity: Intensity,
    ) -> Result<PixelImage, BackendError> {
        let size = input.size();
        let t = intensity.value();
        map_colour(input, |x, y, [r, g, b]| {
            let k = calculations::vignette_factor(x, y, size, t);
            [r * k, g * k, b * k]
        })
    }

    fn hue_rotate(&self, input: &PixelImage, angle: HueAngle) -> Result<PixelImage, BackendError> {
        let degrees = angle.normalized() as f64;
        map_colour(input, |_, _, rgb| calculations::rotate_hue(rgb, degrees))
    }

    fn posterize(&self, input: &PixelImage, levels: Levels) -> Result<PixelImage, BackendError> {
        let n = levels.value();
        map_colour(input, |_, _, [r, g, b]| {
            [
                calculations::posterize(r, n),
                calculations::posterize(g, n),
                calculations::posterize(b, n),
            ]
        })
    }

    fn noir(&self, input: &PixelImage) -> Result<PixelImage, BackendError> {
        map_colour(input, |_, _, rgb| {
            let v = calculations::noir_tone(rgb);
            [v, v, v]
        })
    }

    fn zoom_blur(&self, input: &PixelImage, amount: f64) -> Result<PixelImage, BackendError> {
        if !amount.is_finite() || amount <= 0.0 || amount > MAX_ZOOM_BLUR_AMOUNT {
            return Err(BackendError::ProcessingFailed(format!(
                "zoom blur amount must be in (0, {MAX_ZOOM_BLUR_AMOUNT}], got {amount}"
            )));
        }
        let src = input.as_rgba();
        let (w, h) = src.dimensions();
        let cx = w as f64 / 2.0;
        let cy = h as f64 / 2.0;
        let scales = calculations::zoom_blur_scales(amount, (cx * cx + cy * cy).sqrt());
        let count = scales.len() as f64;

        let out = RgbaImage::from_fn(w, h, |x, y| {
            let px = x as f64 + 0.5 - cx;
            let py = y as f64 + 0.5 - cy;
            let mut acc = [0.0; 4];
            for s in &scales {
                let sample = sample_bilinear(src, cx + px * s - 0.5, cy + py * s - 0.5);
                for c in 0..4 {
                    acc[c] += sample[c];
                }
            }
            Rgba(acc.map(|v| (v / count).round().clamp(0.0, 255.0) as u8))
        });
        wrap(out)
    }

    fn crop(&self, input: &PixelImage, rect: CropRect) -> Result<PixelImage, BackendError> {
        let px = rect.to_pixels(input.size()).ok_or_else(|| {
            BackendError::ProcessingFailed(format!("crop rectangle {rect:?} outside image"))
        })?;
        let view = image::imageops::crop_imm(input.as_rgba(), px.x, px.y, px.width, px.height);
        wrap(view.to_image())
    }
}
