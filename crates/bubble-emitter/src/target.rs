//! EventTarget — grant emitter capability to your own types by composition.
//!
//! Embed an [`EventEmitter`] and implement [`EventTarget::emitter`]; every
//! other method forwards to it. Chaining methods return `&Self`, so calls
//! read the same on the domain type as on a bare emitter.
//!
//! ```
//! use bubble_emitter::{EventEmitter, EventTarget, Listener};
//!
//! struct Widget {
//!     events: EventEmitter,
//! }
//!
//! impl EventTarget for Widget {
//!     fn emitter(&self) -> &EventEmitter {
//!         &self.events
//!     }
//! }
//!
//! let panel = Widget { events: EventEmitter::new() };
//! let button = Widget { events: EventEmitter::new() };
//! panel.append_child(&button).unwrap();
//! panel.on("click", Listener::new(|_, _| {}));
//! button.emit("click", []);
//! ```

use serde_json::Value;

use crate::{
    emitter::{EmitOptions, EventEmitter},
    error::Result,
    event::Event,
    listener::IntoListeners,
    selector::Selector,
};

pub trait EventTarget<A: Send + Sync + 'static = Value> {
    fn emitter(&self) -> &EventEmitter<A>;

    fn on(&self, selector: impl Into<Selector>, listeners: impl IntoListeners<A>) -> &Self
    where
        Self: Sized,
    {
        self.emitter().add_listener(selector, listeners);
        self
    }

    fn once(&self, selector: impl Into<Selector>, listeners: impl IntoListeners<A>) -> &Self
    where
        Self: Sized,
    {
        self.emitter().add_once_listener(selector, listeners);
        self
    }

    fn on_limit(
        &self,
        selector: impl Into<Selector>,
        limit: u32,
        listeners: impl IntoListeners<A>,
    ) -> &Self
    where
        Self: Sized,
    {
        self.emitter().add_limited_listener(selector, limit, listeners);
        self
    }

    fn on_all(&self, listeners: impl IntoListeners<A>) -> &Self
    where
        Self: Sized,
    {
        self.emitter().add_all_listeners(listeners);
        self
    }

    fn off(&self, selector: impl Into<Selector>, listeners: impl IntoListeners<A>) -> &Self
    where
        Self: Sized,
    {
        self.emitter().remove_listener(selector, listeners);
        self
    }

    fn off_all(&self, listeners: impl IntoListeners<A>) -> &Self
    where
        Self: Sized,
    {
        self.emitter().remove_all_listeners(listeners);
        self
    }

    fn emit(
        &self,
        selector: impl Into<Selector>,
        args: impl IntoIterator<Item = A>,
    ) -> Option<Event<A>>
    where
        Self: Sized,
    {
        self.emitter().emit(selector, args)
    }

    fn emit_event(&self, selector: impl Into<Selector>, options: EmitOptions<A>) -> Option<Event<A>>
    where
        Self: Sized,
    {
        self.emitter().emit_event(selector, options)
    }

    fn append_child<T: EventTarget<A> + ?Sized>(&self, child: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.emitter().append_child(child.emitter())
    }

    fn remove_child<T: EventTarget<A> + ?Sized>(&self, child: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.emitter().remove_child(child.emitter())
    }

    fn is_ancestor<T: EventTarget<A> + ?Sized>(&self, node: &T, include_self: bool) -> bool
    where
        Self: Sized,
    {
        self.emitter().is_ancestor(node.emitter(), include_self)
    }
}

impl<A: Send + Sync + 'static> EventTarget<A> for EventEmitter<A> {
    fn emitter(&self) -> &EventEmitter<A> {
        self
    }
}
