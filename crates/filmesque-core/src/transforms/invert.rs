use super::parallel::map_rgb;
use crate::raster::WorkingImage;

/// Per-channel inversion `v' = 1 - v`; alpha is kept.
pub(crate) fn invert(input: &WorkingImage, threshold: usize) -> WorkingImage {
    map_rgb(input, threshold, |[r, g, b]| [1.0 - r, 1.0 - g, 1.0 - b])
}
