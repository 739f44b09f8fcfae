//! Filter pipeline
//!
//! - `context`: caller-owned [`RenderContext`] and [`CancelToken`]
//! - `blend`: global intensity blend between original and filtered images
//!
//! [`apply`] is the single entry point presentation code uses: it composes
//! the filter's recipe, then blends the result once with the original.
//! The identity filter short-circuits both steps.

mod blend;
mod context;


pub use blend::{blend, blend_with_context, FULL_INTENSITY_EPSILON};
pub use context::{CancelToken, RenderContext};

use std::time::Instant;

use crate::catalog::FilterDefinition;
use crate::error::{EngineError, Result};
use crate::raster::{Image, WorkingImage};
use crate::transforms::TransformStep;

/// Render `filter` on `input` and blend the result at `intensity`.
///
/// The identity filter returns `input` untouched whatever the intensity.
/// Entitlement is not checked here; locking premium filters is a selection
/// policy of the caller.
pub fn apply(
    input: &Image,
    filter: &FilterDefinition,
    intensity: f32,
    ctx: &RenderContext,
) -> Result<Image> {
    if filter.is_identity() {
        return Ok(input.clone());
    }

    let filtered = apply_recipe(input, filter, ctx)?;
    Ok(blend_with_context(input, &filtered, intensity, ctx))
}

/// Run the full recipe of `filter` with no blending.
pub fn apply_recipe(input: &Image, filter: &FilterDefinition, ctx: &RenderContext) -> Result<Image> {
    if filter.is_identity() {
        return Ok(input.clone());
    }

    let started = Instant::now();
    let output = apply_steps(input, filter.recipe(), ctx)?;
    log::debug!(
        "rendered '{}' at {}x{} in {:.1?}",
        filter.id(),
        input.width(),
        input.height(),
        started.elapsed()
    );
    Ok(output)
}

/// Fold `steps` left to right over `input`.
///
/// A stage that fails is skipped: its input becomes the input of the next
/// stage. Only cancellation aborts the fold.
pub fn apply_steps(input: &Image, steps: &[TransformStep], ctx: &RenderContext) -> Result<Image> {
    let working = WorkingImage::from_image(input);
    Ok(run_steps(working, steps, ctx)?.to_image())
}

pub(crate) fn run_steps(
    input: WorkingImage,
    steps: &[TransformStep],
    ctx: &RenderContext,
) -> Result<WorkingImage> {
    steps
        .iter()
        .enumerate()
        .try_fold(input, |current, (index, step)| {
            if ctx.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            match step.render(&current, ctx) {
                Ok(next) => Ok(next),
                Err(err) => {
                    log::warn!(
                        "stage {} ({}) failed, passing its input through: {}",
                        index,
                        step.kind(),
                        err
                    );
                    Ok(current)
                }
            }
        })
}
