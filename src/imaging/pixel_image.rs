//! The immutable raster image every filter stage consumes and produces.
//!
//! A [`PixelImage`] is an RGBA8 buffer behind an `Arc`, so cloning is cheap
//! and a decoded image can be handed to several filters (or threads) at once.
//! There is no mutation API: every transform builds a new image.
//!
//! Equality is exact pixel-buffer equality, which is what lets tests prove
//! the pass-through filter returns its input untouched.

use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Container format for encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    #[default]
    Png,
    Jpeg,
}

impl EncodeFormat {
    pub fn extension(self) -> &'static str {
        match self {
            EncodeFormat::Png => "png",
            EncodeFormat::Jpeg => "jpg",
        }
    }
}

/// An in-memory RGBA8 raster with at least one pixel.
#[derive(Clone)]
pub struct PixelImage {
    pixels: Arc<RgbaImage>,
}

impl PixelImage {
    /// Wrap a decoded buffer. Fails when either dimension is zero.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, DecodeError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty { width, height });
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    /// Build an image by evaluating `f` at every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        f: impl FnMut(u32, u32) -> image::Rgba<u8>,
    ) -> Result<Self, DecodeError> {
        Self::from_rgba(RgbaImage::from_fn(width, height, f))
    }

    /// Decode an encoded image (JPEG, PNG, TIFF, WebP) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let decoded = image::load_from_memory(bytes)?;
        Self::from_rgba(decoded.into_rgba8())
    }

    /// Read and decode an image file.
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Pixel-space size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Borrow the underlying buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Raw interleaved RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// True when both handles share the same buffer allocation.
    pub fn ptr_eq(&self, other: &PixelImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// SHA-256 of the size and pixel buffer, as a hex string.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width().to_le_bytes());
        hasher.update(self.height().to_le_bytes());
        hasher.update(self.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Encode into `format`. `quality` only affects JPEG.
    pub fn encode(&self, format: EncodeFormat, quality: u8) -> Result<Vec<u8>, EncodeError> {
        let mut out = std::io::Cursor::new(Vec::new());
        match format {
            EncodeFormat::Png => {
                self.pixels.write_to(&mut out, ImageFormat::Png)?;
            }
            EncodeFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgba8((*self.pixels).clone()).into_rgb8();
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
                rgb.write_with_encoder(encoder)?;
            }
        }
        Ok(out.into_inner())
    }

    /// Encode and write to `path`.
    pub fn save(&self, path: &Path, format: EncodeFormat, quality: u8) -> Result<(), EncodeError> {
        let bytes = self.encode(format, quality)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl PartialEq for PixelImage {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.size() == other.size() && self.as_bytes() == other.as_bytes())
    }
}

impl Eq for PixelImage {}

impl fmt::Debug for PixelImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}
