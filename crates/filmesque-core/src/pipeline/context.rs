//! Rendering context passed explicitly into every pipeline call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{self, EngineConfig};

/// Cooperative cancellation flag checked between recipe stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Settings shared by every stage of a render.
///
/// Owned by the caller and borrowed by the pipeline. It holds no mutable
/// state, so one context can serve any number of concurrent renders; clone it
/// to attach a per-render [`CancelToken`].
#[derive(Debug, Clone)]
pub struct RenderContext {
    parallel_threshold: usize,
    grain_seed: u64,
    cancel: Option<CancelToken>,
}

impl RenderContext {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            parallel_threshold: config.parallel_threshold.max(1),
            grain_seed: config.grain_seed,
            cancel: None,
        }
    }

    /// Copy of this context that stops at the next stage once `token` fires.
    pub fn with_cancel_token(&self, token: CancelToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    pub fn with_parallel_threshold(mut self, pixels: usize) -> Self {
        self.parallel_threshold = pixels.max(1);
        self
    }

    pub fn with_grain_seed(mut self, seed: u64) -> Self {
        self.grain_seed = seed;
        self
    }

    /// Minimum pixel count before per-pixel work is split across threads.
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn grain_seed(&self) -> u64 {
        self.grain_seed
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Context built from the process-wide engine config.
impl Default for RenderContext {
    fn default() -> Self {
        Self::new(config::global_engine_config())
    }
}
