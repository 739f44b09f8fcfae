//! Monochrome conversion with a photographic response.

use super::parallel::map_pixels;
use crate::color::{luma, smoothstep};
use crate::raster::WorkingImage;

/// How far the luma is pulled toward a smoothstep S-curve.
const RESPONSE_STRENGTH: f32 = 0.15;

pub(crate) fn grayscale_mono(input: &WorkingImage, threshold: usize) -> WorkingImage {
    map_pixels(input, threshold, |_, _, [r, g, b, a]| {
        let y = mono_response(luma(r, g, b));
        [y, y, y, a]
    })
}

/// Endpoint-preserving, monotone response curve applied to luma.
#[inline]
pub(crate) fn mono_response(y: f32) -> f32 {
    let y = y.clamp(0.0, 1.0);
    y + RESPONSE_STRENGTH * (smoothstep(y) - y)
}
