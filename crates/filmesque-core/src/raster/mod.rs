//! Raster types shared by every stage of the engine.
//!
//! - [`Image`]: immutable 8-bit RGBA buffer handed across the engine boundary
//! - [`WorkingImage`]: f32 working copy a recipe runs on between conversions
//!
//! Both use straight (non-premultiplied) alpha. Transforms never rescale color
//! by alpha; only grain compositing reads it.

mod working;


pub use working::WorkingImage;

use std::fmt;
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// Interleaved channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Immutable 8-bit RGBA image.
///
/// The pixel buffer is reference counted, so cloning an `Image` is cheap and
/// two clones can be read from any number of threads. Nothing in the engine
/// ever writes into an existing buffer; every transform produces a new one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Image {
    /// Build an image from row-major RGBA8 bytes.
    ///
    /// Rejects zero dimensions and buffers whose length is not exactly
    /// `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = expected_len(width, height)?;
        if pixels.len() != expected {
            return Err(EngineError::MalformedImage(format!(
                "{}x{} RGBA needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }

        Ok(Self::from_validated(width, height, pixels.into()))
    }

    /// Build an image filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let expected = expected_len(width, height)?;
        let pixels: Vec<u8> = rgba.iter().copied().cycle().take(expected).collect();
        Ok(Self::from_validated(width, height, pixels.into()))
    }

    pub(crate) fn from_validated(width: u32, height: u32, pixels: Arc<[u8]>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * CHANNELS);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.pixels[idx..idx + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// True when both images point at the same pixel buffer.
    pub fn shares_buffer(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Aspect-preserving downscale so the longer edge is at most `max_edge`.
    ///
    /// Images that already fit are returned as a clone sharing the same buffer.
    pub fn thumbnail(&self, max_edge: u32) -> Image {
        let max_edge = max_edge.max(1);
        let longest = self.width.max(self.height);
        if longest <= max_edge {
            return self.clone();
        }

        let scale = max_edge as f64 / longest as f64;
        let new_width = ((self.width as f64 * scale).round() as u32).clamp(1, max_edge);
        let new_height = ((self.height as f64 * scale).round() as u32).clamp(1, max_edge);

        let resized = image::imageops::thumbnail(&self.to_rgba_image(), new_width, new_height);
        let (width, height) = resized.dimensions();
        Self::from_validated(width, height, resized.into_raw().into())
    }

    /// Copy into an `image` crate buffer.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        // Length was checked when this image was built.
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.to_vec())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl TryFrom<image::RgbaImage> for Image {
    type Error = EngineError;

    fn try_from(buffer: image::RgbaImage) -> Result<Self> {
        let (width, height) = buffer.dimensions();
        Self::from_rgba8(width, height, buffer.into_raw())
    }
}

impl TryFrom<image::DynamicImage> for Image {
    type Error = EngineError;

    fn try_from(decoded: image::DynamicImage) -> Result<Self> {
        Self::try_from(decoded.into_rgba8())
    }
}

fn expected_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(EngineError::MalformedImage(format!(
            "image dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }

    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| {
            EngineError::MalformedImage(format!("{}x{} image is not addressable", width, height))
        })
}
