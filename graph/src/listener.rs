//! Model change notification.
//!
//! Listeners are invoked synchronously, in registration order, while the
//! mutation is in progress. Every callback receives a read view of the store
//! as it is at that moment:
//! - `element_added`: the subtree is attached and fully materialized
//! - `element_removed`: the subtree is still attached (about to be destroyed)
//! - `value_added` / `value_changed`: the value holds its new text
//! - `value_removed`: the value is already gone from the slot
//!
//! `commit_changes` closes each logical operation and is delivered exactly
//! once, after all other callbacks of that operation.

use crate::ElementStore;
use std::cell::RefCell;
use std::rc::Rc;
use trellis_core::{ElementId, FeatureId, ValueId};

/// Observer of model graph mutations.
pub trait ModelChangeListener {
    fn element_added(&mut self, store: &ElementStore, element: ElementId);

    fn element_removed(&mut self, store: &ElementStore, element: ElementId);

    fn value_added(&mut self, store: &ElementStore, element: ElementId, feature: FeatureId, value: ValueId);

    fn value_removed(&mut self, store: &ElementStore, element: ElementId, feature: FeatureId, value: ValueId);

    fn value_changed(
        &mut self,
        store: &ElementStore,
        element: ElementId,
        feature: FeatureId,
        value: ValueId,
        old_text: &str,
        new_text: &str,
    );

    fn commit_changes(&mut self, store: &ElementStore);
}

/// Shared handle to a listener.
pub type SharedListener = Rc<RefCell<dyn ModelChangeListener>>;

/// Ordered list of listeners, invoked in registration order.
#[derive(Default)]
pub struct ListenerList {
    listeners: Vec<SharedListener>,
}

impl ListenerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: SharedListener) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn element_added(&self, store: &ElementStore, element: ElementId) {
        for listener in &self.listeners {
            listener.borrow_mut().element_added(store, element);
        }
    }

    pub(crate) fn element_removed(&self, store: &ElementStore, element: ElementId) {
        for listener in &self.listeners {
            listener.borrow_mut().element_removed(store, element);
        }
    }

    pub(crate) fn value_added(&self, store: &ElementStore, element: ElementId, feature: FeatureId, value: ValueId) {
        for listener in &self.listeners {
            listener.borrow_mut().value_added(store, element, feature, value);
        }
    }

    pub(crate) fn value_removed(&self, store: &ElementStore, element: ElementId, feature: FeatureId, value: ValueId) {
        for listener in &self.listeners {
            listener.borrow_mut().value_removed(store, element, feature, value);
        }
    }

    pub(crate) fn value_changed(
        &self,
        store: &ElementStore,
        element: ElementId,
        feature: FeatureId,
        value: ValueId,
        old_text: &str,
        new_text: &str,
    ) {
        for listener in &self.listeners {
            listener
                .borrow_mut()
                .value_changed(store, element, feature, value, old_text, new_text);
        }
    }

    pub(crate) fn commit_changes(&self, store: &ElementStore) {
        for listener in &self.listeners {
            listener.borrow_mut().commit_changes(store);
        }
    }
}

impl std::fmt::Debug for ListenerList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerList")
            .field("len", &self.listeners.len())
            .finish()
    }
}
