//! Color science helpers shared by the transforms.
//!
//! Provides luma weights, blackbody color approximation and the per-channel
//! gains used by temperature shifts.

/// Rec. 601 luma weights, the classic photographic desaturation response.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Valid Kelvin range for temperature conversions.
pub const KELVIN_MIN: f32 = 1000.0;
pub const KELVIN_MAX: f32 = 40000.0;

/// Rec. 601 luma of an RGB triple.
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b
}

/// Hermite smoothstep on `[0, 1]`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Approximate RGB color (0-1) of a blackbody radiator at `kelvin`.
///
/// Based on Tanner Helland's polynomial fit of the Planckian locus.
/// Reference: https://tannerhelland.com/2012/09/18/convert-temperature-rgb-algorithm-code.html
#[allow(clippy::excessive_precision)] // Published constants
pub fn kelvin_to_rgb(kelvin: f32) -> [f32; 3] {
    let temp = (kelvin / 100.0).clamp(KELVIN_MIN / 100.0, KELVIN_MAX / 100.0);

    let (r, g, b) = if temp <= 66.0 {
        let r = 255.0;
        let g = 99.4708025861 * temp.ln() - 161.1195681661;
        let b = if temp <= 19.0 {
            0.0
        } else {
            138.5177312231 * (temp - 10.0).ln() - 305.0447927307
        };
        (r, g.clamp(0.0, 255.0), b.clamp(0.0, 255.0))
    } else {
        let r = 329.698727446 * (temp - 60.0).powf(-0.1332047592);
        let g = 288.1221695283 * (temp - 60.0).powf(-0.0755148492);
        let b = 255.0;
        (r.clamp(0.0, 255.0), g.clamp(0.0, 255.0), b)
    };

    [r / 255.0, g / 255.0, b / 255.0]
}

/// Per-channel gains that move the white point from `from_kelvin` to
/// `to_kelvin`, normalized so green is 1.0.
///
/// A lower target warms the image (red up, blue down); a higher target cools
/// it. Equal temperatures return exactly `[1.0, 1.0, 1.0]`.
pub fn temperature_shift_gains(from_kelvin: f32, to_kelvin: f32) -> [f32; 3] {
    if from_kelvin == to_kelvin {
        return [1.0, 1.0, 1.0];
    }

    let from = kelvin_to_rgb(from_kelvin);
    let to = kelvin_to_rgb(to_kelvin);

    let gains = [
        to[0] / from[0].max(0.001),
        to[1] / from[1].max(0.001),
        to[2] / from[2].max(0.001),
    ];

    let g_ref = gains[1].max(0.001);
    [gains[0] / g_ref, 1.0, gains[2] / g_ref]
}
