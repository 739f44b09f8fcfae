//! Completion tracking for one preview run.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::PreviewSet;
use crate::events::{EngineEvent, EventSink};
use crate::pipeline::CancelToken;

/// Outcome counts of a finished preview job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSummary {
    pub ready: usize,
    pub failed: usize,
}

#[derive(Debug)]
struct Counts {
    remaining: usize,
    ready: usize,
    failed: usize,
    /// Set once `PreviewsFinished` has been published
    finished: bool,
}

#[derive(Debug)]
pub(super) struct JobProgress {
    counts: Mutex<Counts>,
    done: Condvar,
}

impl JobProgress {
    pub(super) fn new(total: usize) -> Self {
        Self {
            counts: Mutex::new(Counts {
                remaining: total,
                ready: 0,
                failed: 0,
                finished: false,
            }),
            done: Condvar::new(),
        }
    }

    /// Record one finished task. The last one publishes `PreviewsFinished`
    /// and then wakes waiters; the sink runs with no lock held.
    pub(super) fn finish_one(&self, ok: bool, sink: &dyn EventSink) {
        let finished = {
            let mut counts = self.lock();
            if ok {
                counts.ready += 1;
            } else {
                counts.failed += 1;
            }
            counts.remaining = counts.remaining.saturating_sub(1);
            (counts.remaining == 0).then(|| summary(&counts))
        };
        let Some(summary) = finished else {
            return;
        };

        log::info!(
            "previews finished: {} ready, {} failed",
            summary.ready,
            summary.failed
        );
        sink.publish(EngineEvent::PreviewsFinished {
            ready: summary.ready,
            failed: summary.failed,
        });
        self.lock().finished = true;
        self.done.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Counts> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a running preview job.
///
/// Cloning is cheap; every clone observes the same job.
#[derive(Debug, Clone)]
pub struct PreviewJob {
    set: Arc<PreviewSet>,
    progress: Arc<JobProgress>,
    cancel: CancelToken,
}

impl PreviewJob {
    pub(super) fn new(set: Arc<PreviewSet>, progress: Arc<JobProgress>, cancel: CancelToken) -> Self {
        Self {
            set,
            progress,
            cancel,
        }
    }

    /// Stop rendering previews that have not finished yet.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Previews rendered so far.
    pub fn set(&self) -> &Arc<PreviewSet> {
        &self.set
    }

    pub fn is_complete(&self) -> bool {
        self.progress.lock().finished
    }

    /// Block until every task has finished.
    pub fn wait(&self) -> PreviewSummary {
        let mut counts = self.progress.lock();
        while !counts.finished {
            counts = self
                .progress
                .done
                .wait(counts)
                .unwrap_or_else(PoisonError::into_inner);
        }
        summary(&counts)
    }

    /// Like [`PreviewJob::wait`] but gives up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<PreviewSummary> {
        let deadline = Instant::now() + timeout;
        let mut counts = self.progress.lock();
        while !counts.finished {
            let left = deadline.checked_duration_since(Instant::now())?;
            counts = self
                .progress
                .done
                .wait_timeout(counts, left)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
        Some(summary(&counts))
    }
}

fn summary(counts: &Counts) -> PreviewSummary {
    PreviewSummary {
        ready: counts.ready,
        failed: counts.failed,
    }
}
