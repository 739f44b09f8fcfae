//! Global intensity blend.
//!
//! One uniform linear interpolation over every channel of every pixel,
//! applied once after the whole recipe has run.

use rayon::prelude::*;

use super::RenderContext;
use crate::config::DEFAULT_PARALLEL_THRESHOLD;
use crate::raster::{Image, CHANNELS};

/// Intensities within this distance of 1.0 return the filtered image as-is.
pub const FULL_INTENSITY_EPSILON: f32 = 0.01;

/// Blend `original` toward `filtered` by `intensity`.
///
/// - `intensity >= 1 - FULL_INTENSITY_EPSILON` returns `filtered` unchanged
/// - `intensity <= 0` returns `original` unchanged
/// - otherwise each byte becomes `round(o + (f - o) * intensity)`
///
/// Mismatched dimensions or a NaN intensity cannot produce an output; the
/// original is returned instead.
pub fn blend(original: &Image, filtered: &Image, intensity: f32) -> Image {
    blend_pixels(original, filtered, intensity, DEFAULT_PARALLEL_THRESHOLD)
}

/// [`blend`] that splits work across threads at `ctx.parallel_threshold()`.
pub fn blend_with_context(
    original: &Image,
    filtered: &Image,
    intensity: f32,
    ctx: &RenderContext,
) -> Image {
    blend_pixels(original, filtered, intensity, ctx.parallel_threshold())
}

fn blend_pixels(original: &Image, filtered: &Image, intensity: f32, threshold: usize) -> Image {
    if original.dimensions() != filtered.dimensions() {
        log::warn!(
            "cannot blend {}x{} with {}x{}, keeping original",
            original.width(),
            original.height(),
            filtered.width(),
            filtered.height()
        );
        return original.clone();
    }
    if intensity.is_nan() {
        log::warn!("blend intensity is NaN, keeping original");
        return original.clone();
    }
    if intensity >= 1.0 - FULL_INTENSITY_EPSILON {
        return filtered.clone();
    }
    if intensity <= 0.0 {
        return original.clone();
    }

    let mix = |(o, f): (&u8, &u8)| -> u8 {
        let o = *o as f32;
        let f = *f as f32;
        (o + (f - o) * intensity).round().clamp(0.0, 255.0) as u8
    };

    let pixels: Vec<u8> = if original.pixel_count() >= threshold {
        original
            .as_raw()
            .par_iter()
            .zip(filtered.as_raw().par_iter())
            .with_min_len(CHANNELS * 1024)
            .map(mix)
            .collect()
    } else {
        original
            .as_raw()
            .iter()
            .zip(filtered.as_raw())
            .map(mix)
            .collect()
    };

    Image::from_validated(original.width(), original.height(), pixels.into())
}
