//! EventEmitter — listener registry, dispatcher and parent/child tree.
//!
//! `EventEmitter<A>` is a cheap-to-clone handle; clones share the same
//! registry and tree position, and identity comparisons (`ptr_eq`) are what
//! the tree uses. `A` is the type of the emit arguments passed to listeners.
//!
//! All methods take `&self`. The registry lives behind a `parking_lot::Mutex`
//! that is never held while a listener runs, so listeners may call
//! `on`/`off`/`emit` on any emitter, including the one dispatching them.
//!
//! # Dispatch
//!
//! For each event type a selector resolves to, one [`Event`] is created and
//! the queue is walked in registration order. A listener's [`Flow`] decides
//! whether the loop stops (`Stop`), whether the entry is deregistered
//! (`Remove`, or limit reached), and `stop_immediate_propagation` ends the
//! loop as well. Afterwards the event is re-emitted on the parent unless its
//! propagation was stopped. Types are dispatched and propagated one at a time.

mod registry;
mod tree;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    event::Event,
    listener::{IntoListeners, Listener},
    schedule::{PropagationMode, Scheduler},
    selector::Selector,
};

use self::{registry::Registry, tree::Links};

// ============================================================================
// EmitOptions
// ============================================================================

/// Parameters of [`EventEmitter::emit_event`].
pub struct EmitOptions<A = Value> {
    /// Arguments handed to every listener.
    pub args: Arc<[A]>,
    /// The emitter the event is about. Defaults to the emitting emitter.
    pub target: Option<EventEmitter<A>>,
    pub bubbles: bool,
    pub cancelable: bool,
    /// `false` pre-marks the event as default-prevented.
    pub return_value: bool,
}

impl<A> EmitOptions<A> {
    pub fn with_args(args: impl IntoIterator<Item = A>) -> Self {
        Self {
            args: args.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl<A> Default for EmitOptions<A> {
    fn default() -> Self {
        Self {
            args: Arc::from(Vec::new()),
            target: None,
            bubbles: true,
            cancelable: true,
            return_value: true,
        }
    }
}

impl<A> Clone for EmitOptions<A> {
    fn clone(&self) -> Self {
        Self {
            args: Arc::clone(&self.args),
            target: self.target.clone(),
            bubbles: self.bubbles,
            cancelable: self.cancelable,
            return_value: self.return_value,
        }
    }
}

// ============================================================================
// EmitterBuilder
// ============================================================================

/// Fluent configuration for an [`EventEmitter`].
#[derive(Debug, Default)]
pub struct EmitterBuilder {
    label: Option<String>,
    propagation: PropagationMode,
}

impl EmitterBuilder {
    /// Name shown in log fields and `Debug` output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn propagation(mut self, mode: PropagationMode) -> Self {
        self.propagation = mode;
        self
    }

    /// Shorthand for `propagation(PropagationMode::Deferred(scheduler))`.
    pub fn deferred(self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.propagation(PropagationMode::Deferred(scheduler))
    }

    pub fn build<A>(self) -> EventEmitter<A> {
        EventEmitter {
            inner: Arc::new(Inner {
                label: self.label,
                propagation: self.propagation,
                registry: Mutex::new(None),
                links: Mutex::new(Links::new()),
            }),
        }
    }
}

// ============================================================================
// EventEmitter
// ============================================================================

struct Inner<A> {
    label: Option<String>,
    propagation: PropagationMode,
    /// `None` while the emitter has no listeners at all.
    registry: Mutex<Option<Registry<A>>>,
    links: Mutex<Links<A>>,
}

/// Handle to an event emitter node.
pub struct EventEmitter<A = Value> {
    inner: Arc<Inner<A>>,
}

impl EventEmitter {
    /// Start configuring an emitter. [`EmitterBuilder::build`] picks the
    /// argument type, so this also serves emitters of other payloads.
    pub fn builder() -> EmitterBuilder {
        EmitterBuilder::default()
    }
}

impl<A> EventEmitter<A> {
    pub fn new() -> Self {
        EmitterBuilder::default().build()
    }

    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// `true` when both handles refer to the same emitter.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    pub fn has_listeners(&self) -> bool {
        self.inner.registry.lock().is_some()
    }

    /// Event types with at least one listener, in first-registration order.
    pub fn event_types(&self) -> Vec<String> {
        self.existing_types().unwrap_or_default()
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.inner
            .registry
            .lock()
            .as_ref()
            .and_then(|r| r.queue(event_type))
            .map_or(0, |q| q.len())
    }

    /// Snapshot of the listeners registered for `event_type`, in order.
    pub fn listeners(&self, event_type: &str) -> Vec<Listener<A>> {
        self.inner
            .registry
            .lock()
            .as_ref()
            .and_then(|r| r.queue(event_type))
            .map(|q| q.entries().map(|e| e.listener.clone()).collect())
            .unwrap_or_default()
    }

    fn existing_types(&self) -> Option<Vec<String>> {
        self.inner.registry.lock().as_ref().map(Registry::type_names)
    }

    /// Run `f` on the registry, discarding it if `f` leaves it empty.
    fn with_registry<R>(&self, f: impl FnOnce(&mut Registry<A>) -> R) -> Option<R> {
        let mut guard = self.inner.registry.lock();
        let registry = guard.as_mut()?;
        let out = f(registry);
        if registry.is_empty() {
            *guard = None;
        }
        Some(out)
    }
}

impl<A: Send + Sync + 'static> EventEmitter<A> {
    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register `listeners` for every type `selector` names.
    ///
    /// Literal names create queues as needed; `"*"` and patterns only extend
    /// queues that already exist. Already-registered listeners are skipped.
    pub fn add_listener(
        &self,
        selector: impl Into<Selector>,
        listeners: impl IntoListeners<A>,
    ) -> &Self {
        self.register(selector.into(), listeners.into_listeners(), None)
    }

    /// Alias of [`add_listener`](Self::add_listener).
    pub fn on(&self, selector: impl Into<Selector>, listeners: impl IntoListeners<A>) -> &Self {
        self.add_listener(selector, listeners)
    }

    /// Register listeners that deregister after their first invocation.
    pub fn add_once_listener(
        &self,
        selector: impl Into<Selector>,
        listeners: impl IntoListeners<A>,
    ) -> &Self {
        self.register(selector.into(), listeners.into_listeners(), Some(1))
    }

    /// Alias of [`add_once_listener`](Self::add_once_listener).
    pub fn once(&self, selector: impl Into<Selector>, listeners: impl IntoListeners<A>) -> &Self {
        self.add_once_listener(selector, listeners)
    }

    /// Register listeners that deregister after `limit` invocations.
    ///
    /// A `limit` of zero registers nothing.
    pub fn add_limited_listener(
        &self,
        selector: impl Into<Selector>,
        limit: u32,
        listeners: impl IntoListeners<A>,
    ) -> &Self {
        if limit == 0 {
            return self;
        }
        self.register(selector.into(), listeners.into_listeners(), Some(limit))
    }

    /// Alias of [`add_limited_listener`](Self::add_limited_listener).
    pub fn on_limit(
        &self,
        selector: impl Into<Selector>,
        limit: u32,
        listeners: impl IntoListeners<A>,
    ) -> &Self {
        self.add_limited_listener(selector, limit, listeners)
    }

    /// Add `listeners` to every existing queue.
    pub fn add_all_listeners(&self, listeners: impl IntoListeners<A>) -> &Self {
        self.add_listener(Selector::Wildcard, listeners)
    }

    /// Alias of [`add_all_listeners`](Self::add_all_listeners).
    pub fn on_all(&self, listeners: impl IntoListeners<A>) -> &Self {
        self.add_all_listeners(listeners)
    }

    fn register(&self, selector: Selector, listeners: Vec<Listener<A>>, limit: Option<u32>) -> &Self {
        if selector.is_empty() || listeners.is_empty() {
            return self;
        }
        if selector.is_literal() {
            let mut guard = self.inner.registry.lock();
            let registry = guard.get_or_insert_with(Registry::new);
            for name in selector.literal_names() {
                registry.insert(name, &listeners, limit, true);
            }
            return self;
        }
        // Patterns are evaluated without the lock held; they are user code.
        let Some(existing) = self.existing_types() else {
            return self;
        };
        let matched = selector.select(existing);
        self.with_registry(|registry| {
            for name in &matched {
                registry.insert(name, &listeners, limit, false);
            }
        });
        self
    }

    // ------------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------------

    /// Deregister `listeners` from every existing type `selector` matches.
    ///
    /// With no listeners (`()`), the matched queues are cleared entirely.
    pub fn remove_listener(
        &self,
        selector: impl Into<Selector>,
        listeners: impl IntoListeners<A>,
    ) -> &Self {
        let selector = selector.into();
        let listeners = listeners.into_listeners();
        if selector.is_empty() {
            return self;
        }
        let Some(existing) = self.existing_types() else {
            return self;
        };
        let matched = selector.select(existing);
        if listeners.is_empty() && !matched.is_empty() {
            tracing::debug!(
                emitter = ?self.inner.label,
                types = ?matched,
                "clearing listener queues"
            );
        }
        self.with_registry(|registry| {
            for name in &matched {
                registry.remove(name, &listeners);
            }
        });
        self
    }

    /// Alias of [`remove_listener`](Self::remove_listener).
    pub fn off(&self, selector: impl Into<Selector>, listeners: impl IntoListeners<A>) -> &Self {
        self.remove_listener(selector, listeners)
    }

    /// Remove `listeners` from every queue; `()` removes everything.
    pub fn remove_all_listeners(&self, listeners: impl IntoListeners<A>) -> &Self {
        self.remove_listener(Selector::Wildcard, listeners)
    }

    /// Alias of [`remove_all_listeners`](Self::remove_all_listeners).
    pub fn off_all(&self, listeners: impl IntoListeners<A>) -> &Self {
        self.remove_all_listeners(listeners)
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Emit `selector` with `args`, targeting this emitter. The event bubbles
    /// and is cancelable.
    ///
    /// Returns the last event dispatched on this emitter, if any.
    pub fn emit(
        &self,
        selector: impl Into<Selector>,
        args: impl IntoIterator<Item = A>,
    ) -> Option<Event<A>> {
        self.emit_event(selector, EmitOptions::with_args(args))
    }

    /// Dispatch primitive behind [`emit`](Self::emit) and bubbling.
    ///
    /// An emitter with no listeners at all forwards the call to its parent
    /// unchanged (with the target resolved). Otherwise each existing type the
    /// selector matches is dispatched and then propagated.
    pub fn emit_event(
        &self,
        selector: impl Into<Selector>,
        options: EmitOptions<A>,
    ) -> Option<Event<A>> {
        let selector = selector.into();
        if selector.is_empty() {
            return None;
        }
        let target = options.target.clone().unwrap_or_else(|| self.clone());

        let Some(existing) = self.existing_types() else {
            if let Some(parent) = self.parent() {
                tracing::trace!(
                    emitter = ?self.inner.label,
                    parent = ?parent.inner.label,
                    selector = ?selector,
                    "no listeners, forwarding to parent"
                );
                parent.emit_event(
                    selector,
                    EmitOptions {
                        target: Some(target),
                        ..options
                    },
                );
            }
            return None;
        };

        let mut last = None;
        for event_type in selector.select(existing) {
            if let Some(event) = self.dispatch(&event_type, &target, &options) {
                self.propagate(&event);
                last = Some(event);
            }
        }
        last
    }

    /// Build the event for one type, honouring `options.return_value`.
    pub fn create_event(
        &self,
        event_type: &str,
        target: &EventEmitter<A>,
        options: &EmitOptions<A>,
    ) -> Event<A> {
        let event = Event::init(
            event_type,
            self.clone(),
            target.clone(),
            options.bubbles,
            options.cancelable,
            Arc::clone(&options.args),
        );
        if !options.return_value {
            event.prevent_default();
        }
        event
    }

    /// Walk the queue for `event_type`. `None` if the type has no queue.
    fn dispatch(
        &self,
        event_type: &str,
        target: &EventEmitter<A>,
        options: &EmitOptions<A>,
    ) -> Option<Event<A>> {
        let dispatch = registry::next_tag();
        let opened = self
            .with_registry(|r| r.begin(event_type, dispatch))
            .unwrap_or(false);
        if !opened {
            return None;
        }

        tracing::trace!(
            emitter = ?self.inner.label,
            event_type,
            listeners = self.listener_count(event_type),
            "dispatching event"
        );

        let event = self.create_event(event_type, target, options);
        loop {
            let step = self
                .with_registry(|r| r.next(event_type, dispatch))
                .flatten();
            let Some((listener, tag)) = step else {
                break;
            };

            let flow = listener.invoke(&event, event.args());

            let stop = self
                .with_registry(|r| r.settle(event_type, tag, flow))
                .unwrap_or(false);
            if stop || event.is_immediate_propagation_stopped() {
                break;
            }
        }
        self.with_registry(|r| r.finish(event_type, dispatch));

        Some(event)
    }

    /// Re-emit `event`'s type on the parent unless propagation was stopped.
    fn propagate(&self, event: &Event<A>) {
        if event.is_propagation_stopped() {
            return;
        }
        let Some(parent) = self.parent() else {
            return;
        };
        let event_type = event.event_type().to_owned();
        let options = EmitOptions {
            args: event.emit_args(),
            target: Some(event.target().clone()),
            bubbles: event.bubbles(),
            cancelable: event.cancelable(),
            return_value: event.return_value(),
        };

        match &self.inner.propagation {
            PropagationMode::Synchronous => {
                tracing::trace!(
                    emitter = ?self.inner.label,
                    parent = ?parent.inner.label,
                    event_type = %event_type,
                    "propagating event"
                );
                parent.emit_event(Selector::Name(event_type), options);
            }
            PropagationMode::Deferred(scheduler) => {
                tracing::trace!(
                    emitter = ?self.inner.label,
                    parent = ?parent.inner.label,
                    event_type = %event_type,
                    "scheduling deferred propagation"
                );
                scheduler.schedule(Box::new(move || {
                    parent.emit_event(Selector::Name(event_type), options);
                }));
            }
        }
    }
}

impl<A> Clone for EventEmitter<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> Default for EventEmitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> PartialEq for EventEmitter<A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A> Eq for EventEmitter<A> {}

impl<A> fmt::Debug for EventEmitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("label", &self.inner.label)
            .field("propagation", &self.inner.propagation)
            .field("event_types", &self.event_types())
            .finish()
    }
}
