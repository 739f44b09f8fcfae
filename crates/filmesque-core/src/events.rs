//! Events published by the engine.
//!
//! Presentation code observes previews and session renders through an
//! [`EventSink`]. Sinks are called from worker threads with no engine lock
//! held, so they may query or drive the session that published the event.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::catalog::FilterId;
use crate::raster::Image;

#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A session render was scheduled.
    ProcessingStarted { generation: u64, filter: FilterId },
    /// The latest session render finished.
    ResultReady {
        generation: u64,
        filter: FilterId,
        image: Image,
    },
    /// The latest session render could not produce an image.
    RenderFailed {
        generation: u64,
        filter: FilterId,
        reason: String,
    },
    PreviewReady { filter: FilterId, image: Image },
    PreviewFailed { filter: FilterId, reason: String },
    /// Every preview task of a job has finished.
    PreviewsFinished { ready: usize, failed: usize },
}

pub trait EventSink: Send + Sync {
    fn publish(&self, event: EngineEvent);
}

impl EventSink for Sender<EngineEvent> {
    fn publish(&self, event: EngineEvent) {
        if self.send(event).is_err() {
            log::trace!("event receiver dropped");
        }
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn publish(&self, event: EngineEvent) {
        (**self).publish(event)
    }
}

/// Adapts a closure into an [`EventSink`].
pub struct CallbackSink<F>(pub F);

impl<F> EventSink for CallbackSink<F>
where
    F: Fn(EngineEvent) + Send + Sync,
{
    fn publish(&self, event: EngineEvent) {
        (self.0)(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: EngineEvent) {}
}
