//! Parameter types for pixel operations.
//!
//! These structs describe *how strongly* or *where* an operation acts, never
//! how the pixels are computed. They sit between the named-parameter map on an
//! [`Operation`](crate::operation::Operation) and the typed primitives of a
//! [`FilterBackend`](super::FilterBackend).
//!
//! ## Types
//!
//! - [`Intensity`]: blend strength for sepia and vignette. Not clamped: an
//!   out-of-range value is reported at execution time.
//! - [`HueAngle`]: rotation in whole degrees, as shown in filter titles.
//! - [`Levels`]: number of quantisation levels per channel for posterize.
//! - [`CropRect`]: a rectangle in source pixel coordinates.

/// Blend strength in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intensity(pub f64);

impl Intensity {
    pub const SEPIA_DEFAULT: Intensity = Intensity(0.5);
    pub const VIGNETTE_DEFAULT: Intensity = Intensity(0.9);

    pub fn value(self) -> f64 {
        self.0
    }

    /// True when the value is finite and within `0.0..=1.0`.
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && (0.0..=1.0).contains(&self.0)
    }
}

/// Hue rotation angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HueAngle(pub i32);

impl HueAngle {
    pub fn degrees(self) -> i32 {
        self.0
    }

    /// The same rotation expressed in `0..360`.
    pub fn normalized(self) -> i32 {
        self.0.rem_euclid(360)
    }
}

/// Quantisation levels per channel for posterize (2..=256).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Levels(pub u32);

impl Levels {
    pub const DEFAULT: Levels = Levels(6);

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        (2..=256).contains(&self.0)
    }
}

impl Default for Levels {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Rectangle in source pixel coordinates, origin top-left.
///
/// Stored as floats so proportional rectangles (e.g. a 10% margin) keep their
/// exact value until they are snapped to the pixel grid by [`CropRect::to_pixels`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A crop rectangle snapped to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from a `[x, y, width, height]` parameter vector.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [x, y, w, h] => Some(Self::new(*x, *y, *w, *h)),
            _ => None,
        }
    }

    pub fn to_vec(self) -> Vec<f64> {
        vec![self.x, self.y, self.width, self.height]
    }

    /// Round to the pixel grid and check the result lies inside `bounds`.
    ///
    /// Returns `None` for non-finite values, negative origins, empty
    /// rectangles, or rectangles that extend past the image.
    pub fn to_pixels(self, bounds: (u32, u32)) -> Option<PixelRect> {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return None;
        }
        let x = self.x.round() as u64;
        let y = self.y.round() as u64;
        let width = self.width.round() as u64;
        let height = self.height.round() as u64;
        if width == 0 || height == 0 {
            return None;
        }
        if x + width > bounds.0 as u64 || y + height > bounds.1 as u64 {
            return None;
        }
        Some(PixelRect {
            x: x as u32,
            y: y as u32,
            width: width as u32,
            height: height as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_defaults() {
        assert_eq!(Intensity::SEPIA_DEFAULT.value(), 0.5);
        assert_eq!(Intensity::VIGNETTE_DEFAULT.value(), 0.9);
    }

    #[test]
    fn intensity_validity() {
        assert!(Intensity(0.0).is_valid());
        assert!(Intensity(1.0).is_valid());
        assert!(!Intensity(1.5).is_valid());
        assert!(!Intensity(-0.1).is_valid());
        assert!(!Intensity(f64::NAN).is_valid());
    }

    #[test]
    fn hue_angle_normalizes_negative_and_large() {
        assert_eq!(HueAngle(-90).normalized(), 270);
        assert_eq!(HueAngle(450).normalized(), 90);
        assert_eq!(HueAngle(90).degrees(), 90);
    }

    #[test]
    fn levels_range() {
        assert!(Levels::DEFAULT.is_valid());
        assert!(!Levels(1).is_valid());
        assert!(Levels(256).is_valid());
        assert!(!Levels(257).is_valid());
    }

    #[test]
    fn crop_rect_from_slice_requires_four_values() {
        assert!(CropRect::from_slice(&[1.0, 2.0, 3.0]).is_none());
        let rect = CropRect::from_slice(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(rect, CropRect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(rect.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn crop_rect_rounds_to_pixels() {
        let rect = CropRect::new(40.0, 30.0, 320.0, 240.0);
        assert_eq!(
            rect.to_pixels((400, 300)),
            Some(PixelRect {
                x: 40,
                y: 30,
                width: 320,
                height: 240
            })
        );
    }

    #[test]
    fn crop_rect_outside_bounds_is_rejected() {
        assert!(CropRect::new(100.0, 0.0, 350.0, 10.0).to_pixels((400, 300)).is_none());
        assert!(CropRect::new(0.0, 0.0, 0.0, 10.0).to_pixels((400, 300)).is_none());
        assert!(CropRect::new(-1.0, 0.0, 10.0, 10.0).to_pixels((400, 300)).is_none());
        assert!(CropRect::new(0.0, f64::NAN, 10.0, 10.0).to_pixels((400, 300)).is_none());
    }
}
