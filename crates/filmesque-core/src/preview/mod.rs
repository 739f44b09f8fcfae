//! Preview generation
//!
//! Renders a thumbnail of the source through every catalog filter on a
//! dedicated rayon pool. Each filter is an independent task:
//! - the identity preview is the thumbnail itself and is published before any
//!   task is spawned
//! - a task that fails or panics leaves its entry absent and never affects
//!   the others
//! - results land in a shared [`PreviewSet`] as they complete, so callers can
//!   observe partial progress
//!
//! Previews always show the fully applied look; no intensity blend runs here.

mod job;


pub use job::{PreviewJob, PreviewSummary};

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::catalog::{Catalog, FilterDefinition, FilterId};
use crate::config::{self, EngineConfig};
use crate::error::{EngineError, Result};
use crate::events::{EngineEvent, EventSink};
use crate::pipeline::{apply_recipe, CancelToken, RenderContext};
use crate::raster::Image;

use job::JobProgress;

/// Previews rendered so far, keyed by filter. A missing key means the preview
/// is not ready yet, or failed.
#[derive(Debug, Default)]
pub struct PreviewSet {
    entries: Mutex<HashMap<FilterId, Image>>,
}

impl PreviewSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Image> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every preview available right now.
    pub fn snapshot(&self) -> HashMap<FilterId, Image> {
        self.lock().clone()
    }

    fn insert(&self, id: FilterId, image: Image) {
        self.lock().insert(id, image);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FilterId, Image>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs preview jobs on its own worker pool.
pub struct PreviewScheduler {
    pool: Arc<ThreadPool>,
    thumbnail_size: u32,
    ctx: RenderContext,
}

impl PreviewScheduler {
    /// Build a scheduler with a pool sized by `config.worker_threads`.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("filmesque-preview-{}", i));
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;
        log::debug!("preview pool started with {} threads", pool.current_num_threads());
        Ok(Self::with_pool(Arc::new(pool), config))
    }

    /// Build a scheduler from the process-wide engine config.
    pub fn from_global() -> Result<Self> {
        Self::new(config::global_engine_config())
    }

    /// Build a scheduler that shares an existing pool.
    pub fn with_pool(pool: Arc<ThreadPool>, config: &EngineConfig) -> Self {
        Self {
            pool,
            thumbnail_size: config.thumbnail_size,
            ctx: RenderContext::new(config),
        }
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size
    }

    /// Start rendering a preview of `source` for every entry of `catalog`.
    ///
    /// Returns immediately. Events go to `sink` as each preview completes,
    /// followed by one [`EngineEvent::PreviewsFinished`]. Tasks that have not
    /// finished when the job is cancelled report `PreviewFailed`.
    pub fn generate(
        &self,
        source: &Image,
        catalog: &Catalog,
        sink: Arc<dyn EventSink>,
    ) -> PreviewJob {
        let thumbnail = source.thumbnail(self.thumbnail_size);
        let set = Arc::new(PreviewSet::new());
        let progress = Arc::new(JobProgress::new(catalog.len()));
        let cancel = CancelToken::new();
        let ctx = self.ctx.with_cancel_token(cancel.clone());
        log::debug!(
            "generating {} previews at {}x{}",
            catalog.len(),
            thumbnail.width(),
            thumbnail.height()
        );

        let identity = catalog.identity();
        set.insert(identity.id().clone(), thumbnail.clone());
        sink.publish(EngineEvent::PreviewReady {
            filter: identity.id().clone(),
            image: thumbnail.clone(),
        });
        progress.finish_one(true, sink.as_ref());

        for filter in catalog.iter().skip(1) {
            let filter = filter.clone();
            let thumbnail = thumbnail.clone();
            let ctx = ctx.clone();
            let set = Arc::clone(&set);
            let progress = Arc::clone(&progress);
            let sink = Arc::clone(&sink);

            self.pool.spawn(move || {
                let ok = render_preview(&thumbnail, &filter, &ctx, &set, sink.as_ref());
                progress.finish_one(ok, sink.as_ref());
            });
        }

        PreviewJob::new(set, progress, cancel)
    }
}

fn render_preview(
    thumbnail: &Image,
    filter: &FilterDefinition,
    ctx: &RenderContext,
    set: &PreviewSet,
    sink: &dyn EventSink,
) -> bool {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| apply_recipe(thumbnail, filter, ctx)));
    let reason = match outcome {
        Ok(Ok(image)) => {
            set.insert(filter.id().clone(), image.clone());
            sink.publish(EngineEvent::PreviewReady {
                filter: filter.id().clone(),
                image,
            });
            return true;
        }
        Ok(Err(EngineError::Cancelled)) => {
            log::debug!("preview for '{}' cancelled", filter.id());
            EngineError::Cancelled.to_string()
        }
        Ok(Err(err)) => {
            log::warn!("preview for '{}' failed: {}", filter.id(), err);
            err.to_string()
        }
        Err(payload) => {
            let reason = format!("panicked: {}", panic_message(payload.as_ref()));
            log::warn!("preview for '{}' {}", filter.id(), reason);
            reason
        }
    };

    sink.publish(EngineEvent::PreviewFailed {
        filter: filter.id().clone(),
        reason,
    });
    false
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
