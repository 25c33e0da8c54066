//! The Identifier Registry - qualified names kept current under mutation.
//!
//! An element's identifier is the identifier of its nearest named ancestor
//! (or the empty string) joined with its own name fragment. Elements
//! without a fragment have no identifier and pass their prefix through to
//! their children.

use crate::{Binding, BindingIndex, IdentifierOptions, NameFragment};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use trellis_core::{ElementId, FeatureId, ValueId};
use trellis_graph::{ElementStore, ModelChangeListener};

/// Observer of identifier changes.
///
/// `old` is `None` when an identifier is created, `new` is `None` when it is
/// removed. Listeners must not call back into the registry.
pub trait IdentifierChangeListener {
    fn identifier_changed(&mut self, element: ElementId, old: Option<&str>, new: Option<&str>);
}

pub type SharedIdentifierListener = Rc<RefCell<dyn IdentifierChangeListener>>;

/// Computes and indexes element identifiers.
pub struct IdentifierRegistry {
    options: IdentifierOptions,
    fragment: NameFragment,
    identifiers: HashMap<ElementId, String>,
    index: BindingIndex,
    listeners: Vec<SharedIdentifierListener>,
}

impl IdentifierRegistry {
    /// Name elements by `options.name_attribute`.
    pub fn new(options: IdentifierOptions) -> Self {
        let fragment = NameFragment::attribute(options.name_attribute.clone());
        Self::with_fragment(options, fragment)
    }

    /// Name elements by a custom fragment function.
    pub fn with_fragment(options: IdentifierOptions, fragment: NameFragment) -> Self {
        Self {
            options,
            fragment,
            identifiers: HashMap::new(),
            index: BindingIndex::new(),
            listeners: Vec::new(),
        }
    }

    pub fn options(&self) -> &IdentifierOptions {
        &self.options
    }

    // ==================== Queries ====================

    /// Identifier of an element, `None` if it is unnamed.
    pub fn get_identifier(&self, element: ElementId) -> Option<&str> {
        self.identifiers.get(&element).map(String::as_str)
    }

    /// Element(s) bound to an identifier.
    pub fn get_element(&self, identifier: &str) -> Option<&Binding> {
        self.index.get(identifier)
    }

    /// All bound identifiers, in no particular order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.index.identifiers()
    }

    /// Number of named elements.
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn add_identifier_change_listener(&mut self, listener: SharedIdentifierListener) {
        self.listeners.push(listener);
    }

    // ==================== Maintenance ====================

    /// Recompute every identifier from scratch.
    ///
    /// Used when the registry is attached to a model that already has content.
    pub fn rebuild(&mut self, store: &ElementStore) {
        let stale: Vec<ElementId> = self
            .identifiers
            .keys()
            .copied()
            .filter(|element| !store.contains(*element))
            .collect();
        for element in stale {
            self.change_identifier(element, None);
        }
        for root in store.roots() {
            self.update_qualified_names(store, *root, String::new());
        }
    }

    /// Recompute an element and cascade into its containment subtree.
    fn update_element(&mut self, store: &ElementStore, element: ElementId) {
        if !store.contains(element) {
            return;
        }
        let prefix = store
            .ancestors(element)
            .find_map(|ancestor| self.identifiers.get(&ancestor))
            .cloned()
            .unwrap_or_default();
        self.update_qualified_names(store, element, prefix);
    }

    fn update_qualified_names(&mut self, store: &ElementStore, element: ElementId, prefix: String) {
        let mut stack = vec![(element, prefix)];
        while let Some((current, prefix)) = stack.pop() {
            let qualified = match self.fragment.compute(store, current) {
                Some(fragment) => {
                    let qualified = self.options.qualify(&prefix, &fragment);
                    self.change_identifier(current, Some(qualified.clone()));
                    qualified
                }
                None => {
                    self.change_identifier(current, None);
                    prefix
                }
            };
            let children: Vec<ElementId> = store.child_elements(current).collect();
            stack.extend(children.into_iter().rev().map(|child| (child, qualified.clone())));
        }
    }

    fn remove_identifiers(&mut self, store: &ElementStore, element: ElementId) {
        let subtree: Vec<ElementId> = store.subtree(element).collect();
        for id in subtree {
            self.change_identifier(id, None);
        }
    }

    fn change_identifier(&mut self, element: ElementId, identifier: Option<String>) {
        let old = self.identifiers.get(&element).cloned();
        if old == identifier {
            return;
        }

        if let Some(old) = &old {
            self.index.unbind(old, element);
            self.identifiers.remove(&element);
        }
        if let Some(new) = &identifier {
            self.index.bind(new.clone(), element);
            self.identifiers.insert(element, new.clone());
        }

        tracing::trace!(%element, old = ?old, new = ?identifier, "identifier changed");
        for listener in &self.listeners {
            listener
                .borrow_mut()
                .identifier_changed(element, old.as_deref(), identifier.as_deref());
        }
    }
}

impl std::fmt::Debug for IdentifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierRegistry")
            .field("options", &self.options)
            .field("identifiers", &self.identifiers.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ModelChangeListener for IdentifierRegistry {
    fn element_added(&mut self, store: &ElementStore, element: ElementId) {
        self.update_element(store, element);
    }

    fn element_removed(&mut self, store: &ElementStore, element: ElementId) {
        self.remove_identifiers(store, element);
    }

    fn value_added(&mut self, store: &ElementStore, element: ElementId, _: FeatureId, _: ValueId) {
        self.update_element(store, element);
    }

    fn value_removed(&mut self, store: &ElementStore, element: ElementId, _: FeatureId, _: ValueId) {
        self.update_element(store, element);
    }

    fn value_changed(
        &mut self,
        store: &ElementStore,
        element: ElementId,
        _: FeatureId,
        _: ValueId,
        _: &str,
        _: &str,
    ) {
        self.update_element(store, element);
    }

    fn commit_changes(&mut self, _: &ElementStore) {}
}
