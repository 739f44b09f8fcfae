//! Sepia tone.
//!
//! Failure: none beyond parameter validation.

use super::parallel::map_rgb;
use super::SepiaParams;
use crate::raster::WorkingImage;

/// Classic sepia matrix (rows produce R, G, B).
const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

pub(crate) fn sepia_tone(input: &WorkingImage, params: &SepiaParams, threshold: usize) -> WorkingImage {
    let strength = params.intensity;
    map_rgb(input, threshold, |rgb| {
        let toned = sepia_point(rgb);
        [
            rgb[0] + (toned[0] - rgb[0]) * strength,
            rgb[1] + (toned[1] - rgb[1]) * strength,
            rgb[2] + (toned[2] - rgb[2]) * strength,
        ]
    })
}

/// Full-strength sepia of one pixel, clamped to `[0, 1]`.
#[inline]
pub(crate) fn sepia_point([r, g, b]: [f32; 3]) -> [f32; 3] {
    let m = &SEPIA_MATRIX;
    [
        (m[0][0] * r + m[0][1] * g + m[0][2] * b).min(1.0),
        (m[1][0] * r + m[1][1] * g + m[1][2] * b).min(1.0),
        (m[2][0] * r + m[2][1] * g + m[2][2] * b).min(1.0),
    ]
}
