//! Propagation scheduling.
//!
//! Bubbling normally runs inline, before `emit` returns. An emitter built
//! with [`PropagationMode::Deferred`] instead hands each propagation step to a
//! [`Scheduler`] so that the parent sees the event after the current
//! synchronous turn has finished.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after the current synchronous turn.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, task: Task);
}

/// How an emitter forwards unstopped events to its parent.
#[derive(Clone, Default)]
pub enum PropagationMode {
    /// Propagate inline, before `emit` returns.
    #[default]
    Synchronous,
    /// Propagate from a task handed to the scheduler.
    Deferred(Arc<dyn Scheduler>),
}

impl fmt::Debug for PropagationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationMode::Synchronous => f.write_str("Synchronous"),
            PropagationMode::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

// ============================================================================
// DeferredQueue
// ============================================================================

/// Manually drained FIFO scheduler.
///
/// Tasks queue up until [`run_pending`](Self::run_pending) is called. Tasks
/// scheduled while draining run in the same drain.
#[derive(Default)]
pub struct DeferredQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Run queued tasks until none remain. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop under the lock, run without it: tasks may schedule more.
            let next = self.tasks.lock().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl Scheduler for DeferredQueue {
    fn schedule(&self, task: Task) {
        self.tasks.lock().push_back(task);
    }
}

impl fmt::Debug for DeferredQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredQueue")
            .field("pending", &self.len())
            .finish()
    }
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// Spawns each task onto a tokio runtime.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime of the calling context.
    ///
    /// Panics outside a tokio runtime, like `Handle::current`.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

#[cfg(feature = "tokio")]
impl Scheduler for TokioScheduler {
    fn schedule(&self, task: Task) {
        drop(self.handle.spawn(async move { task() }));
    }
}
