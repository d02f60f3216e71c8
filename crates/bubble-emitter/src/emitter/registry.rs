//! Listener registry — per-type queues plus live dispatch cursors.
//!
//! Every queue records the cursors of the dispatches currently walking it.
//! A cursor stores the index of the next entry to invoke, so removing the
//! entry at index `i` shifts every cursor whose `next > i` back by one. This
//! keeps an in-flight dispatch from skipping or repeating survivors when a
//! listener removes itself or another entry of the same queue.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::listener::{Flow, Listener};

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Process-unique tag for entries and dispatches.
pub(crate) fn next_tag() -> u64 {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// Entry / Cursor / Queue
// ============================================================================

pub(crate) struct Entry<A> {
    pub(crate) listener: Listener<A>,
    /// Remaining invocations; `None` is unbounded.
    limit: Option<u32>,
    tag: u64,
}

impl<A> Entry<A> {
    /// Count one invocation. Returns `true` when the limit is used up.
    fn consume(&mut self) -> bool {
        match &mut self.limit {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    dispatch: u64,
    next: usize,
}

pub(crate) struct Queue<A> {
    entries: Vec<Entry<A>>,
    cursors: Vec<Cursor>,
}

impl<A> Queue<A> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursors: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry<A>> {
        self.entries.iter()
    }

    fn position(&self, listener: &Listener<A>) -> Option<usize> {
        self.entries.iter().position(|e| e.listener.same(listener))
    }

    fn extend(&mut self, listeners: &[Listener<A>], limit: Option<u32>) {
        for listener in listeners {
            if self.position(listener).is_none() {
                self.entries.push(Entry {
                    listener: listener.clone(),
                    limit,
                    tag: next_tag(),
                });
            }
        }
    }

    fn remove_at(&mut self, index: usize) {
        self.entries.remove(index);
        for cursor in &mut self.cursors {
            if cursor.next > index {
                cursor.next -= 1;
            }
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Insertion-ordered map of event type to queue. Never holds empty queues.
pub(crate) struct Registry<A> {
    queues: IndexMap<String, Queue<A>>,
}

impl<A> Registry<A> {
    pub(crate) fn new() -> Self {
        Self {
            queues: IndexMap::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub(crate) fn type_names(&self) -> Vec<String> {
        self.queues.keys().cloned().collect()
    }

    pub(crate) fn queue(&self, event_type: &str) -> Option<&Queue<A>> {
        self.queues.get(event_type)
    }

    /// Append `listeners` to the queue for `event_type`, skipping duplicates.
    ///
    /// A missing queue is only created when `create` is set.
    pub(crate) fn insert(
        &mut self,
        event_type: &str,
        listeners: &[Listener<A>],
        limit: Option<u32>,
        create: bool,
    ) {
        if let Some(queue) = self.queues.get_mut(event_type) {
            queue.extend(listeners, limit);
        } else if create {
            let mut queue = Queue::new();
            queue.extend(listeners, limit);
            self.queues.insert(event_type.to_owned(), queue);
        }
    }

    /// Remove `listeners` from `event_type`; an empty slice clears the queue.
    pub(crate) fn remove(&mut self, event_type: &str, listeners: &[Listener<A>]) {
        if listeners.is_empty() {
            self.queues.shift_remove(event_type);
            return;
        }
        let Some(queue) = self.queues.get_mut(event_type) else {
            return;
        };
        for listener in listeners {
            if let Some(index) = queue.position(listener) {
                queue.remove_at(index);
            }
        }
        if queue.entries.is_empty() {
            self.queues.shift_remove(event_type);
        }
    }

    // ------------------------------------------------------------------------
    // Dispatch cursor protocol: begin → next / settle … → finish
    // ------------------------------------------------------------------------

    /// Open a cursor on `event_type`. Returns `false` if there is no queue.
    pub(crate) fn begin(&mut self, event_type: &str, dispatch: u64) -> bool {
        match self.queues.get_mut(event_type) {
            Some(queue) => {
                queue.cursors.push(Cursor { dispatch, next: 0 });
                true
            }
            None => false,
        }
    }

    /// Advance the cursor and hand out the entry it passed over.
    ///
    /// `None` once the queue is exhausted, or when the queue this cursor was
    /// opened on has been cleared.
    pub(crate) fn next(&mut self, event_type: &str, dispatch: u64) -> Option<(Listener<A>, u64)> {
        let queue = self.queues.get_mut(event_type)?;
        let cursor = queue.cursors.iter_mut().find(|c| c.dispatch == dispatch)?;
        let entry = queue.entries.get(cursor.next)?;
        cursor.next += 1;
        Some((entry.listener.clone(), entry.tag))
    }

    /// Apply a listener's [`Flow`] to its entry. Returns `true` to stop the loop.
    pub(crate) fn settle(&mut self, event_type: &str, tag: u64, flow: Flow) -> bool {
        let stop = flow == Flow::Stop;
        let Some(queue) = self.queues.get_mut(event_type) else {
            return stop;
        };
        // The listener may already have removed itself.
        let Some(index) = queue.entries.iter().position(|e| e.tag == tag) else {
            return stop;
        };
        let exhausted = queue.entries[index].consume();
        if flow == Flow::Remove || exhausted {
            queue.remove_at(index);
            if queue.entries.is_empty() {
                self.queues.shift_remove(event_type);
            }
        }
        stop
    }

    pub(crate) fn finish(&mut self, event_type: &str, dispatch: u64) {
        if let Some(queue) = self.queues.get_mut(event_type) {
            queue.cursors.retain(|c| c.dispatch != dispatch);
        }
    }
}
