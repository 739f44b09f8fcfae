//! White-balance shift between two color temperatures.
//!
//! Failure: either temperature outside `[1000, 40000]` K or non-finite.

use super::parallel::map_rgb;
use super::TemperatureParams;
use crate::color::temperature_shift_gains;
use crate::raster::WorkingImage;

pub(crate) fn temperature_shift(
    input: &WorkingImage,
    params: &TemperatureParams,
    threshold: usize,
) -> WorkingImage {
    let gains = temperature_shift_gains(params.from_kelvin, params.to_kelvin);
    log::trace!(
        "temperature shift {}K -> {}K gains {:?}",
        params.from_kelvin,
        params.to_kelvin,
        gains
    );

    map_rgb(input, threshold, |[r, g, b]| {
        [r * gains[0], g * gains[1], b * gains[2]]
    })
}
