//! Row-parallel pixel mapping with threshold-based dispatch.
//!
//! Images with at least `threshold` pixels are processed row by row on the
//! rayon pool the caller is running in; smaller images stay sequential where
//! the scheduling overhead would dominate. Both paths produce identical output.

use rayon::prelude::*;

use crate::raster::{WorkingImage, CHANNELS};

/// Map every pixel of `input` through `f(x, y, rgba)` into a new image.
pub(crate) fn map_pixels<F>(input: &WorkingImage, threshold: usize, f: F) -> WorkingImage
where
    F: Fn(u32, u32, [f32; 4]) -> [f32; 4] + Sync,
{
    let row_len = input.width() as usize * CHANNELS;
    let mut data = vec![0.0f32; input.data().len()];

    let process_row = |(y, (out_row, in_row)): (usize, (&mut [f32], &[f32]))| {
        for (x, (out_px, in_px)) in out_row
            .chunks_exact_mut(CHANNELS)
            .zip(in_row.chunks_exact(CHANNELS))
            .enumerate()
        {
            let px = f(x as u32, y as u32, [in_px[0], in_px[1], in_px[2], in_px[3]]);
            out_px.copy_from_slice(&px);
        }
    };

    if input.pixel_count() >= threshold {
        data.par_chunks_exact_mut(row_len)
            .zip(input.data().par_chunks_exact(row_len))
            .enumerate()
            .for_each(&process_row);
    } else {
        data.chunks_exact_mut(row_len)
            .zip(input.data().chunks_exact(row_len))
            .enumerate()
            .for_each(&process_row);
    }

    WorkingImage::from_parts(input.width(), input.height(), data)
}

/// Apply `f` to the RGB channels of every pixel, keeping alpha.
pub(crate) fn map_rgb<F>(input: &WorkingImage, threshold: usize, f: F) -> WorkingImage
where
    F: Fn([f32; 3]) -> [f32; 3] + Sync,
{
    map_pixels(input, threshold, |_, _, [r, g, b, a]| {
        let [r, g, b] = f([r, g, b]);
        [clamp_unit(r), clamp_unit(g), clamp_unit(b), a]
    })
}

/// Clamp to `[0, 1]`. NaN is propagated so the caller can detect it.
#[inline]
pub(crate) fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> WorkingImage {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.push(x as f32 / width as f32);
                data.push(y as f32 / height as f32);
                data.push(0.5);
                data.push(1.0);
            }
        }
        WorkingImage::from_parts(width, height, data)
    }

    #[test]
    fn test_map_pixels_passes_coordinates() {
        let input = gradient(4, 3);
        let output = map_pixels(&input, usize::MAX, |x, y, px| [x as f32, y as f32, px[2], px[3]]);
        assert_eq!(output.pixel(3, 2), Some([3.0, 2.0, 0.5, 1.0]));
        assert_eq!(output.pixel(0, 1), Some([0.0, 1.0, 0.5, 1.0]));
    }

    #[test]
    fn test_parallel_and_sequential_paths_match() {
        let input = gradient(64, 48);
        let f = |x: u32, y: u32, px: [f32; 4]| [px[0] * 0.5, px[1] + 0.1, (x + y) as f32, px[3]];

        let sequential = map_pixels(&input, usize::MAX, f);
        let parallel = map_pixels(&input, 1, f);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_map_rgb_keeps_alpha_and_clamps() {
        let input = WorkingImage::from_parts(1, 1, vec![0.5, 0.5, 0.5, 0.25]);
        let output = map_rgb(&input, usize::MAX, |[r, g, b]| [r * 4.0, g - 1.0, b]);
        assert_eq!(output.pixel(0, 0), Some([1.0, 0.0, 0.5, 0.25]));
    }
}
