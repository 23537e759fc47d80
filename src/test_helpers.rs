//! Shared test utilities for the filtergraph test suite.
//!
//! Synthetic images with known pixel content, plus a tolerant comparison
//! for primitives that round through floating point.
//!
//! # Usage
//!
//! ```rust
//! use crate::imaging::params::HueAngle;
//! use crate::imaging::{FilterBackend, RustBackend};
//! use crate::test_helpers::*;
//!
//! let img = gradient_image(64, 48);
//! let out = RustBackend.hue_rotate(&img, HueAngle(360)).unwrap();
//! assert_pixels_close(&out, &img, 1);
//! ```

use crate::imaging::PixelImage;
use image::Rgba;

// =========================================================================
// Fixtures
// =========================================================================

/// Opaque gradient: red ramps along x, green along y, blue fixed at 128.
///
/// Every row and column differs, so any geometric or colour change shows up.
pub fn gradient_image(width: u32, height: u32) -> PixelImage {
    let ramp = |v: u32, len: u32| {
        if len <= 1 {
            0
        } else {
            (v * 255 / (len - 1)) as u8
        }
    };
    PixelImage::from_fn(width, height, |x, y| {
        Rgba([ramp(x, width), ramp(y, height), 128, 255])
    })
    .unwrap()
}

/// Single-colour image.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> PixelImage {
    PixelImage::from_fn(width, height, |_, _| Rgba(rgba)).unwrap()
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert same size and every channel within `tolerance`.
#[track_caller]
pub fn assert_pixels_close(actual: &PixelImage, expected: &PixelImage, tolerance: u8) {
    assert_eq!(actual.size(), expected.size(), "image sizes differ");
    for (x, y, a) in actual.as_rgba().enumerate_pixels() {
        let e = expected.as_rgba().get_pixel(x, y);
        for c in 0..4 {
            let diff = a.0[c].abs_diff(e.0[c]);
            assert!(
                diff <= tolerance,
                "pixel ({x}, {y}) channel {c}: {} vs {} (tolerance {tolerance})",
                a.0[c],
                e.0[c]
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::HueAngle;
    use crate::imaging::{FilterBackend, RustBackend};

    #[test]
    fn module_usage_example_holds() {
        let img = gradient_image(64, 48);
        let out = RustBackend.hue_rotate(&img, HueAngle(360)).unwrap();
        assert_pixels_close(&out, &img, 1);
    }
}
