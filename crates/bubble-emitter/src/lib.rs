//! DOM-style event emitter with parent-chain bubbling.
//!
//! # Modules
//!
//! - [`event`] — [`Event`], the per-dispatch descriptor with its cancellation latches.
//! - [`listener`] — [`Listener`] handles, [`HandleEvent`] delegates and the [`Flow`] protocol.
//! - [`selector`] — [`Selector`]: exact, multi-name, wildcard and pattern targeting.
//! - [`emitter`] — [`EventEmitter`]: registry, dispatch and the emitter tree.
//! - [`schedule`] — [`PropagationMode`] and schedulers for deferred bubbling.
//! - [`target`] — [`EventTarget`], emitter capability by composition.
//! - [`error`] — [`TreeError`].

pub mod emitter;
pub mod error;
pub mod event;
pub mod listener;
pub mod schedule;
pub mod selector;
pub mod target;

pub use emitter::{EmitOptions, EmitterBuilder, EventEmitter};
pub use error::{Result, TreeError};
pub use event::{Event, EventPhase};
pub use listener::{Flow, HandleEvent, IntoFlow, IntoListeners, Listener};
#[cfg(feature = "tokio")]
pub use schedule::TokioScheduler;
pub use schedule::{DeferredQueue, PropagationMode, Scheduler, Task};
pub use selector::{NameTest, Selector};
pub use target::EventTarget;
