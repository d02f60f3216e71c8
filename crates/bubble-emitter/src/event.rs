//! Event — one firing of one event type on one emitter.
//!
//! An `Event` is created by the emitter immediately before a queue is walked
//! and is never reused. Listeners receive it by shared reference and steer the
//! rest of the dispatch through three one-way latches:
//!
//!   - default-prevented (`prevent_default`), only when `cancelable`.
//!   - propagation-stopped (`stop_propagation`), pre-latched when `!bubbles`.
//!   - immediate-propagation-stopped (`stop_immediate_propagation`), which also
//!     latches propagation-stopped and ends the current listener loop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::emitter::EventEmitter;

/// Where in the propagation chain the listener currently runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// The listener is registered on the emitter the event is about.
    AtTarget,
    /// The event was forwarded from a descendant.
    Bubbling,
}

/// One dispatch of one event type.
pub struct Event<A = Value> {
    event_type: String,
    current_target: EventEmitter<A>,
    target: EventEmitter<A>,
    bubbles: bool,
    cancelable: bool,
    time_stamp: Instant,
    emit_args: Arc<[A]>,
    default_prevented: AtomicBool,
    propagation_stopped: AtomicBool,
    immediate_propagation_stopped: AtomicBool,
}

impl<A> Event<A> {
    /// Build an event for `event_type` running on `current_target`.
    ///
    /// A non-bubbling event starts with propagation already stopped, so
    /// `stop_propagation` can be called unconditionally by listeners.
    pub fn init(
        event_type: impl Into<String>,
        current_target: EventEmitter<A>,
        target: EventEmitter<A>,
        bubbles: bool,
        cancelable: bool,
        emit_args: Arc<[A]>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            current_target,
            target,
            bubbles,
            cancelable,
            time_stamp: Instant::now(),
            emit_args,
            default_prevented: AtomicBool::new(false),
            propagation_stopped: AtomicBool::new(!bubbles),
            immediate_propagation_stopped: AtomicBool::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The emitter whose queue is being walked.
    pub fn current_target(&self) -> &EventEmitter<A> {
        &self.current_target
    }

    /// The emitter the event is about. Stays fixed while bubbling.
    pub fn target(&self) -> &EventEmitter<A> {
        &self.target
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn time_stamp(&self) -> Instant {
        self.time_stamp
    }

    /// Arguments passed to `emit`, shared by every event of the dispatch.
    pub fn args(&self) -> &[A] {
        &self.emit_args
    }

    pub(crate) fn emit_args(&self) -> Arc<[A]> {
        Arc::clone(&self.emit_args)
    }

    pub fn event_phase(&self) -> EventPhase {
        if self.current_target.ptr_eq(&self.target) {
            EventPhase::AtTarget
        } else {
            EventPhase::Bubbling
        }
    }

    /// Mark the default action as prevented.
    ///
    /// Returns `false` without effect when the event is not cancelable.
    pub fn prevent_default(&self) -> bool {
        if !self.cancelable {
            return false;
        }
        self.default_prevented.store(true, Ordering::Relaxed);
        true
    }

    /// Keep the event from reaching the parent emitter.
    ///
    /// Returns `false` when the event does not bubble (already stopped).
    pub fn stop_propagation(&self) -> bool {
        if !self.bubbles {
            return false;
        }
        self.propagation_stopped.store(true, Ordering::Relaxed);
        true
    }

    /// Stop propagation and skip the remaining listeners of this queue.
    pub fn stop_immediate_propagation(&self) {
        self.stop_propagation();
        self.immediate_propagation_stopped
            .store(true, Ordering::Relaxed);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::Relaxed)
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::Relaxed)
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped.load(Ordering::Relaxed)
    }

    /// `false` once the default action has been prevented.
    pub fn return_value(&self) -> bool {
        !self.is_default_prevented()
    }

    /// `true` once propagation has been stopped.
    pub fn cancel_bubble(&self) -> bool {
        self.is_propagation_stopped()
    }
}

impl<A: fmt::Debug> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.event_type)
            .field("phase", &self.event_phase())
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .field("default_prevented", &self.is_default_prevented())
            .field("propagation_stopped", &self.is_propagation_stopped())
            .field(
                "immediate_propagation_stopped",
                &self.is_immediate_propagation_stopped(),
            )
            .field("args", &self.emit_args)
            .finish()
    }
}
