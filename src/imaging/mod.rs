//! Pixel-level image processing.
//!
//! | Primitive | Implementation |
//! |---|---|
//! | **Decode / encode** | `image` crate (JPEG, PNG, TIFF, WebP) |
//! | **Sepia, invert, noir** | per-pixel colour maps |
//! | **Hue rotate** | RGB → HSV → RGB |
//! | **Vignette** | radial falloff from the centre |
//! | **Posterize** | per-channel quantisation |
//! | **Zoom blur** | radial average of bilinear samples |
//! | **Crop** | `image::imageops::crop_imm` |
//!
//! The module is split into:
//! - **Calculations**: Pure colour and geometry math (unit testable)
//! - **Parameters**: Typed, validated operation parameters
//! - **PixelImage**: Immutable, cheaply cloned RGBA buffer
//! - **Backend**: [`FilterBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod params;
pub mod pixel_image;
pub mod rust_backend;

pub use backend::{BackendError, FilterBackend};
pub use calculations::{MAX_ZOOM_BLUR_AMOUNT, ZOOM_BLUR_AMOUNT, ZOOM_BLUR_MARGIN, zoom_blur_crop_rect};
pub use params::{CropRect, HueAngle, Intensity, Levels};
pub use pixel_image::{DecodeError, EncodeError, EncodeFormat, PixelImage};
pub use rust_backend::RustBackend;
