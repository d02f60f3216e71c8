//! Parent/child links between emitters.
//!
//! A child holds its parent strongly, since bubbling walks upward; the
//! parent's child list is weak and pruned whenever it is read. A parent
//! therefore stays reachable for as long as any descendant is alive, and no
//! reference cycle can form. The tree is a forest: one parent at most, no
//! cycles, no duplicate children.
//!
//! Mutations are serialised by one process-wide lock so that concurrent
//! `append_child` calls cannot interleave their cycle checks.

use std::ptr;
use std::sync::{Arc, Weak};

use parking_lot::{const_mutex, Mutex};

use super::{EventEmitter, Inner};
use crate::error::{Result, TreeError};

static TREE_MUTATION: Mutex<()> = const_mutex(());

pub(super) struct Links<A> {
    parent: Option<EventEmitter<A>>,
    children: Vec<Weak<Inner<A>>>,
}

impl<A> Links<A> {
    pub(super) fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
        }
    }

    fn position_of(&mut self, child: &EventEmitter<A>) -> Option<usize> {
        self.children.retain(|c| c.strong_count() > 0);
        self.children
            .iter()
            .position(|c| ptr::eq(c.as_ptr(), Arc::as_ptr(&child.inner)))
    }
}

impl<A> EventEmitter<A> {
    pub fn parent(&self) -> Option<EventEmitter<A>> {
        self.inner.links.lock().parent.clone()
    }

    /// Live children in append order.
    pub fn children(&self) -> Vec<EventEmitter<A>> {
        let mut links = self.inner.links.lock();
        links.children.retain(|c| c.strong_count() > 0);
        links
            .children
            .iter()
            .filter_map(Weak::upgrade)
            .map(|inner| EventEmitter { inner })
            .collect()
    }

    /// Whether `node` is on the parent chain of this emitter.
    ///
    /// The walk starts at `self` when `include_self` is set, otherwise at the
    /// parent.
    pub fn is_ancestor(&self, node: &EventEmitter<A>, include_self: bool) -> bool {
        let mut current = if include_self {
            Some(self.clone())
        } else {
            self.parent()
        };
        while let Some(candidate) = current {
            if candidate.ptr_eq(node) {
                return true;
            }
            current = candidate.parent();
        }
        false
    }

    /// Attach `child` under this emitter, detaching it from any old parent.
    ///
    /// Appending an existing child is a no-op. Fails with
    /// [`TreeError::WouldCycle`] if `child` is this emitter or one of its
    /// ancestors; the tree is left unchanged.
    pub fn append_child(&self, child: &EventEmitter<A>) -> Result<()> {
        let _tree = TREE_MUTATION.lock();
        if self.is_ancestor(child, true) {
            return Err(TreeError::WouldCycle);
        }
        if self.inner.links.lock().position_of(child).is_some() {
            return Ok(());
        }
        if let Some(old_parent) = child.parent() {
            old_parent.unlink(child);
        }

        self.inner
            .links
            .lock()
            .children
            .push(Arc::downgrade(&child.inner));
        child.inner.links.lock().parent = Some(self.clone());

        tracing::debug!(
            parent = ?self.inner.label,
            child = ?child.inner.label,
            "appended child emitter"
        );
        Ok(())
    }

    /// Detach `child` from this emitter.
    ///
    /// Fails with [`TreeError::NotAChild`] if `child` is not a direct child.
    pub fn remove_child(&self, child: &EventEmitter<A>) -> Result<()> {
        let _tree = TREE_MUTATION.lock();
        if !self.unlink(child) {
            return Err(TreeError::NotAChild);
        }
        tracing::debug!(
            parent = ?self.inner.label,
            child = ?child.inner.label,
            "removed child emitter"
        );
        Ok(())
    }

    /// Detach this emitter from its parent, if it has one.
    pub fn detach(&self) {
        let _tree = TREE_MUTATION.lock();
        if let Some(parent) = self.parent() {
            parent.unlink(self);
        }
    }

    fn unlink(&self, child: &EventEmitter<A>) -> bool {
        let removed = {
            let mut links = self.inner.links.lock();
            match links.position_of(child) {
                Some(index) => {
                    links.children.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            // Taken out of the lock: dropping the old parent handle may drop
            // the parent itself.
            let old = child.inner.links.lock().parent.take();
            drop(old);
        }
        removed
    }
}
