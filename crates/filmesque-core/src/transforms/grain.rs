//! Film grain.
//!
//! A gray noise field, hashed from `(seed, x, y)`, is laid over the input
//! with opacity `amount`. Compositing is straight-alpha source-over:
//! `out_a = na + a * (1 - na)` and
//! `out_rgb = (n * na + rgb * a * (1 - na)) / out_a`. The same seed always
//! gives the same grain.
//!
//! Failure: `amount` outside `[0, 1]`.

use super::parallel::map_pixels;
use super::GrainParams;
use crate::raster::WorkingImage;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub(crate) fn noise_grain(
    input: &WorkingImage,
    params: &GrainParams,
    seed: u64,
    threshold: usize,
) -> WorkingImage {
    let na = params.amount;
    map_pixels(input, threshold, |x, y, [r, g, b, a]| {
        let n = noise_value(seed, x, y);
        let out_a = na + a * (1.0 - na);
        if out_a <= 0.0 {
            return [0.0, 0.0, 0.0, 0.0];
        }
        let under = a * (1.0 - na);
        let over = |c: f32| ((n * na + c * under) / out_a).clamp(0.0, 1.0);
        [over(r), over(g), over(b), out_a.clamp(0.0, 1.0)]
    })
}

/// Deterministic noise sample in `[0, 1)` for pixel `(x, y)`.
pub fn noise_value(seed: u64, x: u32, y: u32) -> f32 {
    let mut hash = FNV_OFFSET_BASIS ^ seed;
    for byte in x.to_le_bytes().into_iter().chain(y.to_le_bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    let folded = (hash ^ (hash >> 32)) as u32;
    // 24 bits fit an f32 mantissa exactly, keeping the result below 1.0
    (folded >> 8) as f32 / 16_777_216.0
}
