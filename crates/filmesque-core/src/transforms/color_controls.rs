//! Saturation, brightness and contrast.
//!
//! Applied in that order:
//! - saturation mixes each channel with Rec. 601 luma
//! - brightness adds a constant offset
//! - contrast scales around mid-gray (0.5)
//!
//! Failure: negative saturation or contrast, brightness outside `[-1, 1]`.

use super::parallel::map_rgb;
use super::ColorControlsParams;
use crate::color::luma;
use crate::raster::WorkingImage;

pub(crate) fn color_controls(
    input: &WorkingImage,
    params: &ColorControlsParams,
    threshold: usize,
) -> WorkingImage {
    let params = *params;
    map_rgb(input, threshold, |rgb| color_controls_point(rgb, &params))
}

#[inline]
pub(crate) fn color_controls_point([r, g, b]: [f32; 3], params: &ColorControlsParams) -> [f32; 3] {
    let y = luma(r, g, b);
    let s = params.saturation;
    let adjust = |c: f32| {
        let saturated = y + (c - y) * s;
        let brightened = saturated + params.brightness;
        (brightened - 0.5) * params.contrast + 0.5
    };
    [adjust(r), adjust(g), adjust(b)]
}
