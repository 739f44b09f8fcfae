//! Radial edge darkening.
//!
//! The normalized distance `d` runs from 0 at the image centre to 1 at the
//! corners. Each pixel is scaled by `1 - intensity * smoothstep(d / radius)`.
//!
//! Failure: a non-positive or non-finite radius.

use super::parallel::map_pixels;
use super::VignetteParams;
use crate::color::smoothstep;
use crate::raster::WorkingImage;

pub(crate) fn vignette(input: &WorkingImage, params: &VignetteParams, threshold: usize) -> WorkingImage {
    let cx = input.width() as f32 / 2.0;
    let cy = input.height() as f32 / 2.0;
    let half_diagonal = (cx * cx + cy * cy).sqrt();
    let intensity = params.intensity;
    let radius = params.radius;

    map_pixels(input, threshold, |x, y, [r, g, b, a]| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let d = (dx * dx + dy * dy).sqrt() / half_diagonal;
        let factor = vignette_factor(d, intensity, radius);
        [r * factor, g * factor, b * factor, a]
    })
}

/// Brightness multiplier at normalized distance `d`.
#[inline]
pub(crate) fn vignette_factor(d: f32, intensity: f32, radius: f32) -> f32 {
    1.0 - intensity * smoothstep(d / radius)
}
