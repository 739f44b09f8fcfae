//! f32 working buffer used while a recipe runs.

use super::{Image, CHANNELS};

/// RGBA image with f32 channels in `[0, 1]`.
///
/// A recipe converts its input once, runs every stage on this type and
/// quantizes once at the end, so intermediate stages never lose precision to
/// 8-bit rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingImage {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl WorkingImage {
    pub fn from_image(image: &Image) -> Self {
        let data = image.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Self {
            width: image.width(),
            height: image.height(),
            data,
        }
    }

    pub(crate) fn from_parts(width: u32, height: u32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * CHANNELS);
        Self {
            width,
            height,
            data,
        }
    }

    /// Quantize back to 8-bit. Values are clamped to `[0, 1]` and rounded.
    pub fn to_image(&self) -> Image {
        let pixels: Vec<u8> = self.data.iter().map(|&v| quantize(v)).collect();
        Image::from_validated(self.width, self.height, pixels.into())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.data[idx..idx + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// False if any channel is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

#[inline]
fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
