//! Pure calculation functions for pixel operations.
//!
//! All functions here are pure and testable without any images. Colour values
//! are normalised to `0.0..=1.0`; the backend converts from and to 8-bit.

use super::params::CropRect;

/// Fraction trimmed from each side of a zoom-blurred image.
pub const ZOOM_BLUR_MARGIN: f64 = 0.1;

/// Blur amount used by the zoom-blur filter.
pub const ZOOM_BLUR_AMOUNT: f64 = 20.0;

/// Largest accepted zoom-blur amount. Each output pixel averages `amount`
/// samples, so the cost grows linearly with it.
pub const MAX_ZOOM_BLUR_AMOUNT: f64 = 200.0;

/// Crop rectangle that removes the zoom-blur border.
///
/// Always computed from the size of the image *before* blurring.
///
/// # Examples
/// ```
/// # use filtergraph::imaging::zoom_blur_crop_rect;
/// let rect = zoom_blur_crop_rect((400, 300));
/// assert_eq!((rect.x, rect.y, rect.width, rect.height), (40.0, 30.0, 320.0, 240.0));
/// ```
pub fn zoom_blur_crop_rect(size: (u32, u32)) -> CropRect {
    let (w, h) = (size.0 as f64, size.1 as f64);
    let margin_x = ZOOM_BLUR_MARGIN * w;
    let margin_y = ZOOM_BLUR_MARGIN * h;
    CropRect::new(margin_x, margin_y, w - 2.0 * margin_x, h - 2.0 * margin_y)
}

/// Apply the standard sepia matrix, blended with the original by `intensity`.
pub fn sepia(rgb: [f64; 3], intensity: f64) -> [f64; 3] {
    let [r, g, b] = rgb;
    let toned = [
        (0.393 * r + 0.769 * g + 0.189 * b).min(1.0),
        (0.349 * r + 0.686 * g + 0.168 * b).min(1.0),
        (0.272 * r + 0.534 * g + 0.131 * b).min(1.0),
    ];
    [
        mix(r, toned[0], intensity),
        mix(g, toned[1], intensity),
        mix(b, toned[2], intensity),
    ]
}

fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Convert RGB to HSV. Hue in degrees `0.0..360.0`, saturation and value in `0.0..=1.0`.
pub fn rgb_to_hsv(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    [hue, saturation, max]
}

/// Convert HSV back to RGB.
pub fn hsv_to_rgb(hsv: [f64; 3]) -> [f64; 3] {
    let [h, s, v] = hsv;
    let c = v * s;
    let h_prime = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

/// Rotate the hue of an RGB colour by `degrees`.
pub fn rotate_hue(rgb: [f64; 3], degrees: f64) -> [f64; 3] {
    let [h, s, v] = rgb_to_hsv(rgb);
    hsv_to_rgb([(h + degrees).rem_euclid(360.0), s, v])
}

/// Brightness multiplier for a vignette at pixel `(x, y)`.
///
/// Distance is normalised so the image centre is `0.0` and the corners `1.0`;
/// the factor falls off quadratically and is clamped to `0.0..=1.0`.
pub fn vignette_factor(x: u32, y: u32, size: (u32, u32), intensity: f64) -> f64 {
    let cx = size.0 as f64 / 2.0;
    let cy = size.1 as f64 / 2.0;
    let dx = (x as f64 + 0.5 - cx) / cx;
    let dy = (y as f64 + 0.5 - cy) / cy;
    let dist_sq = (dx * dx + dy * dy) / 2.0;
    (1.0 - intensity * dist_sq).clamp(0.0, 1.0)
}

/// Quantise a normalised channel value to `levels` evenly spaced steps.
pub fn posterize(value: f64, levels: u32) -> f64 {
    let steps = (levels.max(2) - 1) as f64;
    (value * steps).round() / steps
}

/// Rec. 709 luma of a normalised RGB colour.
pub fn luma(rgb: [f64; 3]) -> f64 {
    0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
}

/// Monochrome "film" tone: luma pushed through an S-curve, 70/30 with linear luma.
pub fn noir_tone(rgb: [f64; 3]) -> f64 {
    let l = luma(rgb).clamp(0.0, 1.0);
    let curved = l * l * (3.0 - 2.0 * l);
    0.7 * curved + 0.3 * l
}

/// Number of radial samples taken per pixel for a zoom blur of `amount`.
pub fn zoom_blur_samples(amount: f64) -> u32 {
    amount.round().clamp(1.0, MAX_ZOOM_BLUR_AMOUNT) as u32
}

/// Scale factors toward the centre at which a zoom blur samples the source.
///
/// `half_diagonal` is the distance from the centre to a corner, so a pixel at
/// the corner is smeared over `amount` pixels.
pub fn zoom_blur_scales(amount: f64, half_diagonal: f64) -> Vec<f64> {
    let samples = zoom_blur_samples(amount);
    let reach = if half_diagonal > 0.0 {
        amount / half_diagonal
    } else {
        0.0
    };
    (0..samples)
        .map(|k| 1.0 - (k as f64 / samples as f64) * reach)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    // =========================================================================
    // zoom_blur_crop_rect tests
    // =========================================================================

    #[test]
    fn crop_rect_for_400x300() {
        assert_eq!(
            zoom_blur_crop_rect((400, 300)),
            CropRect::new(40.0, 30.0, 320.0, 240.0)
        );
    }

    #[test]
    fn crop_rect_scales_with_size() {
        assert_eq!(
            zoom_blur_crop_rect((800, 600)),
            CropRect::new(80.0, 60.0, 640.0, 480.0)
        );
        assert_eq!(
            zoom_blur_crop_rect((100, 50)),
            CropRect::new(10.0, 5.0, 80.0, 40.0)
        );
    }

    #[test]
    fn crop_rect_keeps_fractional_margins() {
        let rect = zoom_blur_crop_rect((15, 15));
        assert!((rect.x - 1.5).abs() < 1e-12);
        assert!((rect.width - 12.0).abs() < 1e-12);
    }

    // =========================================================================
    // colour math tests
    // =========================================================================

    #[test]
    fn sepia_zero_intensity_is_identity() {
        let rgb = [0.2, 0.4, 0.6];
        assert!(close(sepia(rgb, 0.0), rgb));
    }

    #[test]
    fn sepia_full_intensity_warms_grey() {
        let [r, g, b] = sepia([0.5, 0.5, 0.5], 1.0);
        assert!(r > g && g > b, "sepia should be warm: {r} {g} {b}");
    }

    #[test]
    fn hsv_round_trip() {
        for rgb in [[1.0, 0.0, 0.0], [0.2, 0.7, 0.3], [0.5, 0.5, 0.5], [0.1, 0.2, 0.9]] {
            assert!(close(hsv_to_rgb(rgb_to_hsv(rgb)), rgb), "{rgb:?}");
        }
    }

    #[test]
    fn rotate_red_by_120_gives_green() {
        assert!(close(rotate_hue([1.0, 0.0, 0.0], 120.0), [0.0, 1.0, 0.0]));
    }

    #[test]
    fn rotate_full_turn_is_identity() {
        let rgb = [0.3, 0.6, 0.9];
        assert!(close(rotate_hue(rgb, 360.0), rgb));
    }

    #[test]
    fn vignette_darkens_corners_more_than_centre() {
        let size = (400, 300);
        let centre = vignette_factor(200, 150, size, 0.9);
        let corner = vignette_factor(0, 0, size, 0.9);
        assert!(centre > 0.99);
        assert!(corner < 0.2);
    }

    #[test]
    fn vignette_zero_intensity_is_flat() {
        assert_eq!(vignette_factor(0, 0, (10, 10), 0.0), 1.0);
    }

    #[test]
    fn posterize_snaps_to_levels() {
        assert_eq!(posterize(0.0, 2), 0.0);
        assert_eq!(posterize(0.6, 2), 1.0);
        assert_eq!(posterize(0.3, 3), 0.5);
    }

    #[test]
    fn noir_tone_preserves_extremes() {
        assert!((noir_tone([0.0, 0.0, 0.0])).abs() < 1e-12);
        assert!((noir_tone([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_blur_scales_start_at_one() {
        let scales = zoom_blur_scales(20.0, 250.0);
        assert_eq!(scales.len(), 20);
        assert_eq!(scales[0], 1.0);
        assert!(scales.windows(2).all(|w| w[1] < w[0]));
        assert!(*scales.last().unwrap() > 1.0 - 20.0 / 250.0);
    }

    #[test]
    fn zoom_blur_single_sample_for_small_amounts() {
        assert_eq!(zoom_blur_samples(0.2), 1);
    }

    #[test]
    fn zoom_blur_sample_count_is_bounded() {
        assert_eq!(zoom_blur_samples(1e10), MAX_ZOOM_BLUR_AMOUNT as u32);
    }
}
