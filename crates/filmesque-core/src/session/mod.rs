//! Interactive editing session
//!
//! Holds the loaded image, the selected filter and the intensity, and renders
//! the combination on a background pool whenever one of them changes.
//!
//! Every change bumps a generation counter and cancels the render it
//! supersedes. A finished render is accepted only if its generation is still
//! the latest, so the displayed result always reflects the most recent
//! request. Changing only the intensity reuses the fully filtered image from
//! the previous render and reruns the blend alone.
//!
//! Events are delivered after the session lock is released, so a sink may
//! call back into the session.

mod outbox;

#[cfg(test)]
mod tests;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::catalog::{Catalog, FilterDefinition, FilterId};
use crate::config::{self, EngineConfig};
use crate::error::{EngineError, Result};
use crate::events::{EngineEvent, EventSink};
use crate::export::{ExportError, ImageSink};
use crate::pipeline::{apply_recipe, blend_with_context, CancelToken, RenderContext};
use crate::preview::{PreviewJob, PreviewScheduler};
use crate::raster::Image;

use outbox::Outbox;

/// Intensity a freshly created session starts at.
pub const DEFAULT_INTENSITY: f32 = 1.0;

/// Point-in-time view of the session, for presentation.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub selected: FilterId,
    pub intensity: f32,
    pub is_processing: bool,
    pub has_source: bool,
    pub result: Option<Image>,
}

struct SessionState {
    source: Option<Image>,
    selected: FilterId,
    intensity: f32,
    generation: u64,
    processing: bool,
    cancel: Option<CancelToken>,
    result: Option<Image>,
    /// Full-strength render of `source` for the filter it names
    filtered: Option<(FilterId, Image)>,
    previews: Option<PreviewJob>,
}

/// Owns one image being edited. See the module docs.
pub struct EditSession {
    catalog: Arc<Catalog>,
    pool: Arc<ThreadPool>,
    previews: PreviewScheduler,
    ctx: RenderContext,
    outbox: Arc<Outbox>,
    state: Arc<Mutex<SessionState>>,
}

impl EditSession {
    /// Create a session with its own render pool and preview pool.
    pub fn new(catalog: Arc<Catalog>, config: &EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("filmesque-render-{}", i));
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = Arc::new(builder.build()?);
        let previews = PreviewScheduler::new(config)?;
        Ok(Self::with_pools(catalog, config, sink, pool, previews))
    }

    /// Create a session configured from the process-wide engine config.
    pub fn with_catalog(catalog: Arc<Catalog>, sink: Arc<dyn EventSink>) -> Result<Self> {
        Self::new(catalog, config::global_engine_config(), sink)
    }

    /// Create a session on caller-provided pools.
    pub fn with_pools(
        catalog: Arc<Catalog>,
        config: &EngineConfig,
        sink: Arc<dyn EventSink>,
        pool: Arc<ThreadPool>,
        previews: PreviewScheduler,
    ) -> Self {
        let selected = catalog.identity().id().clone();
        Self {
            catalog,
            pool,
            previews,
            ctx: RenderContext::new(config),
            outbox: Arc::new(Outbox::new(sink)),
            state: Arc::new(Mutex::new(SessionState {
                source: None,
                selected,
                intensity: DEFAULT_INTENSITY,
                generation: 0,
                processing: false,
                cancel: None,
                result: None,
                filtered: None,
                previews: None,
            })),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replace the source image, start its previews and render the current
    /// selection on it.
    pub fn load_image(&self, image: Image) -> PreviewJob {
        // Thumbnailing and the identity preview happen before locking
        let job = self
            .previews
            .generate(&image, &self.catalog, Arc::clone(self.outbox.sink()));

        {
            let mut state = lock(&self.state);
            if let Some(previous) = state.previews.replace(job.clone()) {
                previous.cancel();
            }
            state.source = Some(image);
            state.result = None;
            state.filtered = None;
            self.schedule_render(&mut state);
        }
        self.outbox.flush();
        job
    }

    /// Drop the source image and anything derived from it.
    pub fn clear_image(&self) {
        let mut state = lock(&self.state);
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        if let Some(job) = state.previews.take() {
            job.cancel();
        }
        state.generation += 1;
        state.source = None;
        state.result = None;
        state.filtered = None;
        state.processing = false;
    }

    /// Select a filter by id and re-render.
    ///
    /// Premium filters are not refused here; gate the choice with
    /// [`crate::entitlement::is_unlocked`] before calling.
    pub fn select_filter(&self, id: &str) -> Result<()> {
        let filter = self.catalog.require(id)?;
        {
            let mut state = lock(&self.state);
            state.selected = filter.id().clone();
            self.schedule_render(&mut state);
        }
        self.outbox.flush();
        Ok(())
    }

    /// Set the blend intensity, clamped to `[0, 1]`, and re-render.
    pub fn set_intensity(&self, intensity: f32) {
        let intensity = if intensity.is_nan() {
            DEFAULT_INTENSITY
        } else {
            intensity.clamp(0.0, 1.0)
        };
        {
            let mut state = lock(&self.state);
            state.intensity = intensity;
            self.schedule_render(&mut state);
        }
        self.outbox.flush();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = lock(&self.state);
        SessionSnapshot {
            generation: state.generation,
            selected: state.selected.clone(),
            intensity: state.intensity,
            is_processing: state.processing,
            has_source: state.source.is_some(),
            result: state.result.clone(),
        }
    }

    pub fn is_processing(&self) -> bool {
        lock(&self.state).processing
    }

    /// Latest accepted result, if any.
    pub fn result(&self) -> Option<Image> {
        lock(&self.state).result.clone()
    }

    /// Preview job for the current image.
    pub fn previews(&self) -> Option<PreviewJob> {
        lock(&self.state).previews.clone()
    }

    /// Hand the latest result to `sink`.
    pub fn save_result(&self, sink: &dyn ImageSink) -> std::result::Result<(), ExportError> {
        let Some(image) = self.result() else {
            return Err(ExportError::NothingToSave);
        };
        match sink.save(&image) {
            Ok(()) => {
                log::info!("saved {}x{} result", image.width(), image.height());
                Ok(())
            }
            Err(err) => {
                log::warn!("saving result failed: {}", err);
                Err(err)
            }
        }
    }

    /// Queue a render of the current state. The caller flushes the outbox
    /// once `state` is unlocked.
    fn schedule_render(&self, state: &mut SessionState) {
        let Some(source) = state.source.clone() else {
            return;
        };
        let Some(filter) = self.catalog.get(state.selected.as_str()).cloned() else {
            return;
        };

        if let Some(previous) = state.cancel.take() {
            previous.cancel();
        }
        state.generation += 1;
        state.processing = true;
        let generation = state.generation;
        let token = CancelToken::new();
        state.cancel = Some(token.clone());

        let cached = state
            .filtered
            .as_ref()
            .filter(|(id, _)| id == filter.id())
            .map(|(_, image)| image.clone());
        let intensity = state.intensity;
        let ctx = self.ctx.with_cancel_token(token);
        let shared = Arc::clone(&self.state);
        let outbox = Arc::clone(&self.outbox);

        self.outbox.push(EngineEvent::ProcessingStarted {
            generation,
            filter: filter.id().clone(),
        });
        log::debug!(
            "render {} scheduled: '{}' at {:.2}",
            generation,
            filter.id(),
            intensity
        );

        self.pool.spawn(move || {
            let outcome = render(&source, &filter, intensity, cached, &ctx);
            complete(&shared, &outbox, generation, filter.id(), outcome);
            outbox.flush();
        });
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        if let Some(job) = state.previews.take() {
            job.cancel();
        }
    }
}

struct RenderOutput {
    filtered: Option<Image>,
    result: Image,
}

fn render(
    source: &Image,
    filter: &FilterDefinition,
    intensity: f32,
    cached: Option<Image>,
    ctx: &RenderContext,
) -> Result<RenderOutput> {
    if filter.is_identity() {
        return Ok(RenderOutput {
            filtered: None,
            result: source.clone(),
        });
    }

    let filtered = match cached {
        Some(image) => image,
        None => apply_recipe(source, filter, ctx)?,
    };
    let result = blend_with_context(source, &filtered, intensity, ctx);
    Ok(RenderOutput {
        filtered: Some(filtered),
        result,
    })
}

/// Accept `outcome` if it is still the latest render and queue its event.
fn complete(
    shared: &Mutex<SessionState>,
    outbox: &Outbox,
    generation: u64,
    filter: &FilterId,
    outcome: Result<RenderOutput>,
) {
    let mut state = lock(shared);
    if state.generation != generation {
        log::debug!(
            "discarding render {} for '{}', latest is {}",
            generation,
            filter,
            state.generation
        );
        return;
    }

    state.processing = false;
    state.cancel = None;
    match outcome {
        Ok(output) => {
            if let Some(filtered) = output.filtered {
                state.filtered = Some((filter.clone(), filtered));
            }
            state.result = Some(output.result.clone());
            outbox.push(EngineEvent::ResultReady {
                generation,
                filter: filter.clone(),
                image: output.result,
            });
        }
        Err(EngineError::Cancelled) => {
            log::debug!("render {} cancelled", generation);
        }
        Err(err) => {
            log::warn!("render {} for '{}' failed: {}", generation, filter, err);
            outbox.push(EngineEvent::RenderFailed {
                generation,
                filter: filter.clone(),
                reason: err.to_string(),
            });
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
