//! Listener handles and the listener return protocol.
//!
//! A listener is either a bare callback or a delegate implementing
//! [`HandleEvent`]. Both are reference-counted; two `Listener`s are the same
//! listener when they point at the same allocation, which is how duplicate
//! registrations are refused and how `off` finds what to remove. Keep a clone
//! of the handle you registered if you intend to remove it later.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::event::Event;

/// What the dispatch loop does after a listener returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Keep going; the entry's invocation limit still applies.
    #[default]
    Continue,
    /// Skip the remaining listeners of this queue for this dispatch.
    Stop,
    /// Deregister this listener and keep going.
    Remove,
}

/// Conversion from a listener's return value into a [`Flow`].
///
/// `false` stops the queue and `true` removes the listener; `()` continues.
pub trait IntoFlow {
    fn into_flow(self) -> Flow;
}

impl IntoFlow for Flow {
    fn into_flow(self) -> Flow {
        self
    }
}

impl IntoFlow for () {
    fn into_flow(self) -> Flow {
        Flow::Continue
    }
}

impl IntoFlow for bool {
    fn into_flow(self) -> Flow {
        if self {
            Flow::Remove
        } else {
            Flow::Stop
        }
    }
}

/// Object-form listener.
pub trait HandleEvent<A = Value>: Send + Sync {
    fn handle_event(&self, event: &Event<A>, args: &[A]) -> Flow;
}

/// Closure type for callback-form listeners.
pub type CallbackFn<A> = dyn Fn(&Event<A>, &[A]) -> Flow + Send + Sync;

/// A registered (or registrable) listener.
pub enum Listener<A = Value> {
    Callback(Arc<CallbackFn<A>>),
    Delegate(Arc<dyn HandleEvent<A>>),
}

impl<A: 'static> Listener<A> {
    /// Wrap a closure. It may return `()`, `bool` or [`Flow`].
    ///
    /// Identity is the allocation made here, not the closure: two calls with
    /// the same `fn` item give two distinct listeners. Keep the returned
    /// handle (or a clone) to deduplicate registrations or to remove it later.
    pub fn new<F, R>(callback: F) -> Self
    where
        F: Fn(&Event<A>, &[A]) -> R + Send + Sync + 'static,
        R: IntoFlow,
    {
        Listener::Callback(Arc::new(move |event: &Event<A>, args: &[A]| {
            callback(event, args).into_flow()
        }))
    }

    /// Wrap a shared delegate. Identity follows the `Arc` allocation.
    pub fn delegate<H: HandleEvent<A> + 'static>(handler: Arc<H>) -> Self {
        Listener::Delegate(handler)
    }
}

impl<A> Listener<A> {
    fn addr(&self) -> *const () {
        match self {
            Listener::Callback(f) => Arc::as_ptr(f) as *const (),
            Listener::Delegate(d) => Arc::as_ptr(d) as *const (),
        }
    }

    /// Structural equality: same callback or same delegate object.
    pub fn same(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    pub(crate) fn invoke(&self, event: &Event<A>, args: &[A]) -> Flow {
        match self {
            Listener::Callback(f) => f(event, args),
            Listener::Delegate(d) => d.handle_event(event, args),
        }
    }
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        match self {
            Listener::Callback(f) => Listener::Callback(Arc::clone(f)),
            Listener::Delegate(d) => Listener::Delegate(Arc::clone(d)),
        }
    }
}

impl<A> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<A> Eq for Listener<A> {}

impl<A> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Listener::Callback(_) => "Callback",
            Listener::Delegate(_) => "Delegate",
        };
        f.debug_tuple(kind).field(&self.addr()).finish()
    }
}

impl<A, H: HandleEvent<A> + 'static> From<Arc<H>> for Listener<A> {
    fn from(handler: Arc<H>) -> Self {
        Listener::Delegate(handler)
    }
}

// ============================================================================
// IntoListeners
// ============================================================================

/// Anything that can be passed where a listener list is expected.
///
/// `()` is the empty list; passing it to `off` clears the matched queues.
pub trait IntoListeners<A> {
    fn into_listeners(self) -> Vec<Listener<A>>;
}

impl<A> IntoListeners<A> for () {
    fn into_listeners(self) -> Vec<Listener<A>> {
        Vec::new()
    }
}

impl<A> IntoListeners<A> for Listener<A> {
    fn into_listeners(self) -> Vec<Listener<A>> {
        vec![self]
    }
}

impl<A> IntoListeners<A> for &Listener<A> {
    fn into_listeners(self) -> Vec<Listener<A>> {
        vec![self.clone()]
    }
}

impl<A> IntoListeners<A> for Vec<Listener<A>> {
    fn into_listeners(self) -> Vec<Listener<A>> {
        self
    }
}

impl<A> IntoListeners<A> for &[Listener<A>] {
    fn into_listeners(self) -> Vec<Listener<A>> {
        self.to_vec()
    }
}

impl<A, const N: usize> IntoListeners<A> for [Listener<A>; N] {
    fn into_listeners(self) -> Vec<Listener<A>> {
        self.into()
    }
}

impl<A, const N: usize> IntoListeners<A> for [&Listener<A>; N] {
    fn into_listeners(self) -> Vec<Listener<A>> {
        self.iter().map(|l| (*l).clone()).collect()
    }
}
