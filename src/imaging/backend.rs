//! Pixel backend trait and shared error type.
//!
//! The [`FilterBackend`] trait is the set of elementary primitives an
//! [`Operation`](crate::operation::Operation) can call. Every primitive takes
//! an input image plus already-validated typed parameters and returns a new
//! image; none of them mutate their input.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), which supports every
//! primitive. Other backends (a GPU path, a reduced platform) may report a
//! primitive as unavailable through [`FilterBackend::supports`]; calling an
//! unsupported primitive yields [`BackendError::Unsupported`].

use super::params::{CropRect, HueAngle, Intensity, Levels};
use super::pixel_image::PixelImage;
use crate::operation::OperationKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("{0} is not supported by this backend")]
    Unsupported(OperationKind),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("primitive produced an empty {width}x{height} image")]
    EmptyOutput { width: u32, height: u32 },
}

/// Elementary image primitives.
///
/// `Sync` so a single backend can serve concurrent `apply` calls from a
/// rayon pool.
pub trait FilterBackend: Sync {
    /// Whether the primitive for `kind` is available.
    fn supports(&self, kind: OperationKind) -> bool;

    fn sepia(&self, input: &PixelImage, intensity: Intensity) -> Result<PixelImage, BackendError>;

    fn invert(&self, input: &PixelImage) -> Result<PixelImage, BackendError>;

    fn vignette(&self, input: &PixelImage, intensity: Intensity)
    -> Result<PixelImage, BackendError>;

    fn hue_rotate(&self, input: &PixelImage, angle: HueAngle) -> Result<PixelImage, BackendError>;

    fn posterize(&self, input: &PixelImage, levels: Levels) -> Result<PixelImage, BackendError>;

    fn noir(&self, input: &PixelImage) -> Result<PixelImage, BackendError>;

    /// Radial blur away from the image centre. `amount` is in pixels.
    fn zoom_blur(&self, input: &PixelImage, amount: f64) -> Result<PixelImage, BackendError>;

    /// Extract `rect`. The rectangle has already been checked against the input bounds.
    fn crop(&self, input: &PixelImage, rect: CropRect) -> Result<PixelImage, BackendError>;
}
