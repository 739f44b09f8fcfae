//! Ordered event delivery for a session.
//!
//! Events are queued while the session state is locked, so queue order is
//! generation order. They are handed to the sink later by [`Outbox::flush`]
//! with no session lock held, which lets a sink read or drive the session
//! from inside `publish`.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::events::{EngineEvent, EventSink};

#[derive(Default)]
struct Pending {
    queue: VecDeque<EngineEvent>,
    queued: u64,
    published: u64,
    /// Thread currently handing events to the sink
    drainer: Option<ThreadId>,
}

pub(super) struct Outbox {
    sink: Arc<dyn EventSink>,
    pending: Mutex<Pending>,
    idle: Condvar,
}

impl Outbox {
    pub(super) fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            pending: Mutex::new(Pending::default()),
            idle: Condvar::new(),
        }
    }

    pub(super) fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    pub(super) fn push(&self, event: EngineEvent) {
        let mut pending = self.lock();
        pending.queue.push_back(event);
        pending.queued += 1;
    }

    /// Deliver everything queued so far.
    ///
    /// One thread drains at a time, in queue order. Another thread calling in
    /// meanwhile waits until its events are out. A call made from inside the
    /// sink returns at once; the outer drain delivers its events next.
    pub(super) fn flush(&self) {
        let current = thread::current().id();
        let mut pending = self.lock();
        let target = pending.queued;

        loop {
            if pending.published >= target {
                return;
            }
            match pending.drainer {
                Some(owner) if owner == current => return,
                Some(_) => {
                    pending = self
                        .idle
                        .wait(pending)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                None => break,
            }
        }

        pending.drainer = Some(current);
        while let Some(event) = pending.queue.pop_front() {
            drop(pending);
            self.sink.publish(event);
            pending = self.lock();
            pending.published += 1;
        }
        pending.drainer = None;
        drop(pending);
        self.idle.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
