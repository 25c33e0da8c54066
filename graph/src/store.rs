//! Element storage: an arena of elements and leaf values addressed by handles.
//!
//! Parent/child and value/owner relations are handle lookups through the
//! store; nothing holds a pointer to anything else.

use std::collections::HashMap;
use std::sync::Arc;
use trellis_core::{ClassId, ElementId, FeatureId, ValueId};
use trellis_metamodel::{FeatureDef, Metamodel};

/// A container of elements: the root collection or a containment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRef {
    Root,
    Feature {
        element: ElementId,
        feature: FeatureId,
    },
}

/// The ordered values of one feature of one element.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Children of a containment feature.
    Elements(Vec<ElementId>),
    /// Leaf values of an attribute or reference feature.
    Values(Vec<ValueId>),
}

/// An instance of a class.
#[derive(Debug, Clone)]
pub struct Element {
    /// Handle of this element.
    pub id: ElementId,
    /// Class of this element.
    pub class: ClassId,
    /// Slot holding this element.
    pub owner: SlotRef,
    /// One slot per feature of the class, in `Metamodel::all_features` order.
    slots: Vec<Slot>,
}

impl Element {
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

/// A leaf node holding an attribute literal or reference identifier.
#[derive(Debug, Clone)]
pub struct LeafValue {
    pub id: ValueId,
    pub element: ElementId,
    pub feature: FeatureId,
    pub text: String,
}

impl LeafValue {
    /// Empty values stand for "not yet filled in" and are ignored by checks.
    pub fn is_placeholder(&self) -> bool {
        self.text.is_empty()
    }
}

/// Handle allocator for elements and values.
#[derive(Debug)]
struct IdAllocator {
    next_element_id: u64,
    next_value_id: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_element_id: 1,
            next_value_id: 1,
        }
    }

    fn alloc_element_id(&mut self) -> ElementId {
        let id = ElementId::new(self.next_element_id);
        self.next_element_id += 1;
        id
    }

    fn alloc_value_id(&mut self) -> ValueId {
        let id = ValueId::new(self.next_value_id);
        self.next_value_id += 1;
        id
    }
}

/// The in-memory element tree.
#[derive(Debug)]
pub struct ElementStore {
    metamodel: Arc<Metamodel>,
    elements: HashMap<ElementId, Element>,
    values: HashMap<ValueId, LeafValue>,
    roots: Vec<ElementId>,
    id_alloc: IdAllocator,
}

impl ElementStore {
    /// Create an empty store for the given metamodel.
    pub fn new(metamodel: Arc<Metamodel>) -> Self {
        Self {
            metamodel,
            elements: HashMap::new(),
            values: HashMap::new(),
            roots: Vec::new(),
            id_alloc: IdAllocator::new(),
        }
    }

    // ==================== Read Access ====================

    pub fn metamodel(&self) -> &Metamodel {
        &self.metamodel
    }

    /// Get an element by handle.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Check whether a handle is still valid.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn class_of(&self, id: ElementId) -> Option<ClassId> {
        self.elements.get(&id).map(|element| element.class)
    }

    pub fn owner_of(&self, id: ElementId) -> Option<SlotRef> {
        self.elements.get(&id).map(|element| element.owner)
    }

    /// Parent element, `None` for root elements and stale handles.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        match self.owner_of(id)? {
            SlotRef::Root => None,
            SlotRef::Feature { element, .. } => Some(element),
        }
    }

    /// Containment feature definition holding this element.
    pub fn containing_feature(&self, id: ElementId) -> Option<&FeatureDef> {
        match self.owner_of(id)? {
            SlotRef::Root => None,
            SlotRef::Feature { feature, .. } => Some(self.metamodel.feature(feature)),
        }
    }

    /// Ancestors from parent up to the root element.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent_of(id), move |current| self.parent_of(*current))
    }

    /// Root elements in order.
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the slot of an element for a feature.
    pub fn slot(&self, element: ElementId, feature: FeatureId) -> Option<&Slot> {
        let element = self.elements.get(&element)?;
        let position = self.metamodel.feature_position(element.class, feature)?;
        element.slots.get(position)
    }

    /// Elements held by a container.
    pub fn slot_elements(&self, slot: SlotRef) -> Option<&[ElementId]> {
        match slot {
            SlotRef::Root => Some(&self.roots),
            SlotRef::Feature { element, feature } => match self.slot(element, feature)? {
                Slot::Elements(children) => Some(children),
                Slot::Values(_) => None,
            },
        }
    }

    /// Children in one containment feature; empty for other features.
    pub fn children(&self, element: ElementId, feature: FeatureId) -> &[ElementId] {
        match self.slot(element, feature) {
            Some(Slot::Elements(children)) => children,
            _ => &[],
        }
    }

    /// All containment children of an element, in slot order.
    pub fn child_elements(&self, element: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .get(&element)
            .into_iter()
            .flat_map(|element| element.slots.iter())
            .filter_map(|slot| match slot {
                Slot::Elements(children) => Some(children.iter().copied()),
                Slot::Values(_) => None,
            })
            .flatten()
    }

    /// Leaf values of an attribute or reference feature; empty otherwise.
    pub fn values(&self, element: ElementId, feature: FeatureId) -> &[ValueId] {
        match self.slot(element, feature) {
            Some(Slot::Values(values)) => values,
            _ => &[],
        }
    }

    /// Get a leaf value by handle.
    pub fn value(&self, id: ValueId) -> Option<&LeafValue> {
        self.values.get(&id)
    }

    pub fn value_text(&self, id: ValueId) -> Option<&str> {
        self.values.get(&id).map(|value| value.text.as_str())
    }

    /// Texts of the non-placeholder values of a feature.
    pub fn value_texts(&self, element: ElementId, feature: FeatureId) -> impl Iterator<Item = &str> + '_ {
        self.values(element, feature)
            .iter()
            .filter_map(|id| self.values.get(id))
            .filter(|value| !value.is_placeholder())
            .map(|value| value.text.as_str())
    }

    /// First non-placeholder text of the named feature of an element.
    pub fn attribute_text(&self, element: ElementId, feature_name: &str) -> Option<&str> {
        let class = self.class_of(element)?;
        let feature = self.metamodel.feature_by_name(class, feature_name)?;
        self.value_texts(element, feature.id).next()
    }

    /// Count of non-placeholder entries of a slot.
    pub fn filled_count(&self, element: ElementId, feature: FeatureId) -> usize {
        match self.slot(element, feature) {
            Some(Slot::Elements(children)) => children.len(),
            Some(Slot::Values(_)) => self.value_texts(element, feature).count(),
            None => 0,
        }
    }

    /// Lazy depth-first walk over all elements in containment order.
    pub fn elements(&self) -> Elements<'_> {
        Elements::new(self, self.roots.iter().copied())
    }

    /// Lazy depth-first walk over the subtree rooted at `root` (inclusive).
    pub fn subtree(&self, root: ElementId) -> Elements<'_> {
        Elements::new(self, std::iter::once(root))
    }

    // ==================== Internal Mutation ====================

    /// Allocate a detached element with empty slots.
    pub(crate) fn alloc_element(&mut self, class: ClassId, owner: SlotRef) -> ElementId {
        let id = self.id_alloc.alloc_element_id();
        let slots = self
            .metamodel
            .all_features(class)
            .iter()
            .map(|feature| {
                if self.metamodel.feature(*feature).is_containment() {
                    Slot::Elements(Vec::new())
                } else {
                    Slot::Values(Vec::new())
                }
            })
            .collect();

        self.elements.insert(
            id,
            Element {
                id,
                class,
                owner,
                slots,
            },
        );
        id
    }

    /// Allocate a detached leaf value.
    pub(crate) fn alloc_value(&mut self, element: ElementId, feature: FeatureId, text: String) -> ValueId {
        let id = self.id_alloc.alloc_value_id();
        self.values.insert(
            id,
            LeafValue {
                id,
                element,
                feature,
                text,
            },
        );
        id
    }

    /// Mutable list of elements held by a container.
    pub(crate) fn slot_elements_mut(&mut self, slot: SlotRef) -> Option<&mut Vec<ElementId>> {
        match slot {
            SlotRef::Root => Some(&mut self.roots),
            SlotRef::Feature { element, feature } => match self.slot_mut(element, feature)? {
                Slot::Elements(children) => Some(children),
                Slot::Values(_) => None,
            },
        }
    }

    /// Mutable list of leaf values of a feature.
    pub(crate) fn slot_values_mut(&mut self, element: ElementId, feature: FeatureId) -> Option<&mut Vec<ValueId>> {
        match self.slot_mut(element, feature)? {
            Slot::Values(values) => Some(values),
            Slot::Elements(_) => None,
        }
    }

    fn slot_mut(&mut self, element: ElementId, feature: FeatureId) -> Option<&mut Slot> {
        let element = self.elements.get_mut(&element)?;
        let position = self.metamodel.feature_position(element.class, feature)?;
        element.slots.get_mut(position)
    }

    pub(crate) fn set_value_text(&mut self, id: ValueId, text: String) -> Option<String> {
        self.values
            .get_mut(&id)
            .map(|value| std::mem::replace(&mut value.text, text))
    }

    /// Remove an element from its owner's list; the subtree stays allocated.
    pub(crate) fn detach_element(&mut self, id: ElementId) {
        if let Some(owner) = self.owner_of(id) {
            if let Some(list) = self.slot_elements_mut(owner) {
                list.retain(|child| *child != id);
            }
        }
    }

    /// Remove a leaf value from its slot and free it.
    pub(crate) fn remove_value(&mut self, id: ValueId) -> Option<LeafValue> {
        let value = self.values.remove(&id)?;
        if let Some(list) = self.slot_values_mut(value.element, value.feature) {
            list.retain(|other| *other != id);
        }
        Some(value)
    }

    /// Free an element, its values and all descendants.
    ///
    /// Returns the number of elements freed.
    pub(crate) fn destroy_subtree(&mut self, root: ElementId) -> usize {
        let mut stack = vec![root];
        let mut freed = 0;
        while let Some(id) = stack.pop() {
            let Some(element) = self.elements.remove(&id) else {
                continue;
            };
            for slot in element.slots {
                match slot {
                    Slot::Elements(children) => stack.extend(children),
                    Slot::Values(values) => {
                        for value in values {
                            self.values.remove(&value);
                        }
                    }
                }
            }
            freed += 1;
        }
        freed
    }
}

/// Depth-first, containment-ordered walk over elements.
///
/// Finite and restartable: create a new one to walk again.
pub struct Elements<'a> {
    store: &'a ElementStore,
    stack: Vec<ElementId>,
}

impl<'a> Elements<'a> {
    fn new(store: &'a ElementStore, start: impl DoubleEndedIterator<Item = ElementId>) -> Self {
        Self {
            store,
            stack: start.rev().collect(),
        }
    }
}

impl Iterator for Elements<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        loop {
            let id = self.stack.pop()?;
            let Some(element) = self.store.elements.get(&id) else {
                continue;
            };
            for slot in element.slots.iter().rev() {
                if let Slot::Elements(children) = slot {
                    self.stack.extend(children.iter().rev().copied());
                }
            }
            return Some(id);
        }
    }
}
