//! Engine defaults and value sanitizing.

use serde::{Deserialize, Serialize};

/// Longest edge, in pixels, of the thumbnails rendered for previews.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 300;

/// Pixel count at which per-pixel work is split across threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 100_000;

pub const DEFAULT_GRAIN_SEED: u64 = 0x5EED_F11A;

const THUMBNAIL_SIZE_RANGE: (u32, u32) = (16, 4096);

/// Runtime settings for the engine.
///
/// Every field is optional in YAML; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest edge of preview thumbnails (16 to 4096)
    pub thumbnail_size: u32,

    /// Threads per worker pool; `None` lets rayon pick from the CPU count
    pub worker_threads: Option<usize>,

    /// Minimum pixel count before a transform runs row-parallel
    pub parallel_threshold: usize,

    /// Seed for the NoiseGrain field
    pub grain_seed: u64,
}

impl EngineConfig {
    /// Bring every field back into its supported range.
    pub(crate) fn sanitize(&mut self) {
        let (min, max) = THUMBNAIL_SIZE_RANGE;
        self.thumbnail_size = self.thumbnail_size.clamp(min, max);
        self.worker_threads = self.worker_threads.filter(|&n| n > 0);
        self.parallel_threshold = self.parallel_threshold.max(1);
    }

    pub(crate) fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            worker_threads: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            grain_seed: DEFAULT_GRAIN_SEED,
        }
    }
}
