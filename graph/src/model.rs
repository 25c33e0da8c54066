//! The model graph: mutation API over the element store.
//!
//! Every public mutation is one logical operation: listeners see all of its
//! callbacks, then exactly one `commit_changes`. Operations can be grouped
//! into a larger logical operation with [`Model::batch`].

use crate::listener::{ListenerList, SharedListener};
use crate::record::{self, extract_record, validate_record};
use crate::{ElementStore, Elements, Slot, SlotRef};
use std::collections::HashSet;
use std::sync::Arc;
use trellis_core::{ElementId, FeatureId, ModelError, ModelResult, Record, RecordBatch, ValueId};
use trellis_metamodel::Metamodel;

/// Where new elements go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementAnchor {
    /// Directly before a sibling element.
    Before(ElementId),
    /// Directly after a sibling element.
    After(ElementId),
    /// At the start of a container.
    Top(SlotRef),
    /// At the end of a container.
    Bottom(SlotRef),
}

/// Where new leaf values go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueAnchor {
    Before(ValueId),
    After(ValueId),
    Top { element: ElementId, feature: FeatureId },
    Bottom { element: ElementId, feature: FeatureId },
}

/// The live element tree plus its listeners.
#[derive(Debug)]
pub struct Model {
    store: ElementStore,
    listeners: ListenerList,
    batch_depth: usize,
    batch_dirty: bool,
}

impl Model {
    /// Create an empty model for the given metamodel.
    pub fn new(metamodel: Arc<Metamodel>) -> Self {
        Self {
            store: ElementStore::new(metamodel),
            listeners: ListenerList::new(),
            batch_depth: 0,
            batch_dirty: false,
        }
    }

    /// Read access to the element tree.
    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn metamodel(&self) -> &Metamodel {
        self.store.metamodel()
    }

    /// Register a listener; listeners are called in registration order.
    pub fn add_model_change_listener(&mut self, listener: SharedListener) {
        self.listeners.add(listener);
    }

    /// Lazy depth-first walk over all elements.
    pub fn elements(&self) -> Elements<'_> {
        self.store.elements()
    }

    // ==================== Batching ====================

    /// Open a logical operation. Nested batches commit with the outermost.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a logical operation, committing if it was the outermost one
    /// and anything changed.
    pub fn commit_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 && self.batch_dirty {
            self.batch_dirty = false;
            self.listeners.commit_changes(&self.store);
        }
    }

    /// Run `f` as one logical operation.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> ModelResult<T>) -> ModelResult<T> {
        self.begin_batch();
        let result = f(self);
        self.commit_batch();
        result
    }

    // ==================== Element Operations ====================

    /// Create one or more elements (with their nested children) at `anchor`.
    ///
    /// The whole input is checked against the metamodel first; on error the
    /// graph is left untouched.
    pub fn create_element(
        &mut self,
        anchor: ElementAnchor,
        data: impl Into<RecordBatch>,
    ) -> ModelResult<Vec<ElementId>> {
        let records = data.into().into_vec();
        let (slot, index) = self.resolve_element_anchor(anchor)?;
        for record in &records {
            validate_record(self.store.metamodel(), record)?;
        }

        self.batch(|model| {
            let mut created = Vec::with_capacity(records.len());
            for (offset, record) in records.iter().enumerate() {
                let id = record::materialize(&mut model.store, record, slot)?;
                let list = model
                    .store
                    .slot_elements_mut(slot)
                    .ok_or_else(|| ModelError::invalid_anchor("container holds no elements"))?;
                let at = (index + offset).min(list.len());
                list.insert(at, id);

                model.batch_dirty = true;
                model.listeners.element_added(&model.store, id);
                created.push(id);
            }
            tracing::debug!(count = created.len(), ?slot, "elements created");
            Ok(created)
        })
    }

    /// Remove elements (and their subtrees) that share one parent slot.
    ///
    /// Returns the number of elements destroyed, descendants included.
    pub fn remove_element(&mut self, elements: &[ElementId]) -> ModelResult<usize> {
        let mut owner = None;
        let mut seen = HashSet::new();
        for id in elements {
            let element_owner = self.store.owner_of(*id).ok_or(ModelError::ElementNotFound(*id))?;
            if *owner.get_or_insert(element_owner) != element_owner {
                return Err(ModelError::MixedParents);
            }
            seen.insert(*id);
        }

        self.batch(|model| {
            let mut freed = 0;
            for id in elements.iter().filter(|id| seen.remove(*id)) {
                model.batch_dirty = true;
                model.listeners.element_removed(&model.store, *id);
                model.store.detach_element(*id);
                freed += model.store.destroy_subtree(*id);
            }
            tracing::debug!(requested = elements.len(), freed, "elements removed");
            Ok(freed)
        })
    }

    /// Serialize an element subtree into the record shape.
    pub fn extract_model(&self, element: ElementId) -> ModelResult<Record> {
        extract_record(&self.store, element)
    }

    /// Serialize all root elements.
    pub fn export_model(&self) -> ModelResult<Vec<Record>> {
        self.store
            .roots()
            .iter()
            .map(|root| extract_record(&self.store, *root))
            .collect()
    }

    /// Replace the whole graph by the given records, as one logical operation.
    pub fn import_model(&mut self, data: impl Into<RecordBatch>) -> ModelResult<Vec<ElementId>> {
        let records = data.into().into_vec();
        for record in &records {
            validate_record(self.store.metamodel(), record)?;
        }

        self.batch(|model| {
            let roots = model.store.roots().to_vec();
            model.remove_element(&roots)?;
            model.create_element(ElementAnchor::Bottom(SlotRef::Root), records)
        })
    }

    // ==================== Value Operations ====================

    /// Insert a leaf value into an attribute or reference slot.
    pub fn create_value(&mut self, anchor: ValueAnchor, text: impl Into<String>) -> ModelResult<ValueId> {
        let mut created = self.create_values(anchor, [text])?;
        created.pop().ok_or_else(|| ModelError::invalid_anchor("no value created"))
    }

    /// Insert several leaf values at one anchor, as one logical operation.
    pub fn create_values(
        &mut self,
        anchor: ValueAnchor,
        texts: impl IntoIterator<Item = impl Into<String>>,
    ) -> ModelResult<Vec<ValueId>> {
        let (element, feature, index) = self.resolve_value_anchor(anchor)?;

        self.batch(|model| {
            let mut created = Vec::new();
            for (offset, text) in texts.into_iter().enumerate() {
                let id = model.store.alloc_value(element, feature, text.into());
                let list = model
                    .store
                    .slot_values_mut(element, feature)
                    .ok_or_else(|| ModelError::invalid_anchor("feature holds no values"))?;
                let at = (index + offset).min(list.len());
                list.insert(at, id);

                model.batch_dirty = true;
                model.listeners.value_added(&model.store, element, feature, id);
                created.push(id);
            }
            tracing::debug!(%element, %feature, count = created.len(), "values created");
            Ok(created)
        })
    }

    /// Replace the text of a leaf value.
    pub fn change_value(&mut self, value: ValueId, text: impl Into<String>) -> ModelResult<()> {
        let (element, feature) = self
            .store
            .value(value)
            .map(|leaf| (leaf.element, leaf.feature))
            .ok_or(ModelError::ValueNotFound(value))?;
        let text = text.into();

        self.batch(|model| {
            let old_text = model
                .store
                .set_value_text(value, text.clone())
                .ok_or(ModelError::ValueNotFound(value))?;
            model.batch_dirty = true;
            model
                .listeners
                .value_changed(&model.store, element, feature, value, &old_text, &text);
            tracing::debug!(%element, %value, old = %old_text, new = %text, "value changed");
            Ok(())
        })
    }

    /// Remove a leaf value from its slot.
    pub fn remove_value(&mut self, value: ValueId) -> ModelResult<()> {
        if self.store.value(value).is_none() {
            return Err(ModelError::ValueNotFound(value));
        }

        self.batch(|model| {
            let removed = model
                .store
                .remove_value(value)
                .ok_or(ModelError::ValueNotFound(value))?;
            model.batch_dirty = true;
            model
                .listeners
                .value_removed(&model.store, removed.element, removed.feature, value);
            tracing::debug!(element = %removed.element, %value, "value removed");
            Ok(())
        })
    }

    // ==================== Anchors ====================

    fn resolve_element_anchor(&self, anchor: ElementAnchor) -> ModelResult<(SlotRef, usize)> {
        match anchor {
            ElementAnchor::Before(sibling) | ElementAnchor::After(sibling) => {
                let owner = self
                    .store
                    .owner_of(sibling)
                    .ok_or(ModelError::ElementNotFound(sibling))?;
                let position = self
                    .store
                    .slot_elements(owner)
                    .and_then(|list| list.iter().position(|id| *id == sibling))
                    .ok_or(ModelError::ElementNotFound(sibling))?;
                let offset = usize::from(matches!(anchor, ElementAnchor::After(_)));
                Ok((owner, position + offset))
            }
            ElementAnchor::Top(slot) | ElementAnchor::Bottom(slot) => {
                if let SlotRef::Feature { element, .. } = slot {
                    if !self.store.contains(element) {
                        return Err(ModelError::ElementNotFound(element));
                    }
                }
                let list = self
                    .store
                    .slot_elements(slot)
                    .ok_or_else(|| ModelError::invalid_anchor("not a containment slot"))?;
                let position = match anchor {
                    ElementAnchor::Top(_) => 0,
                    _ => list.len(),
                };
                Ok((slot, position))
            }
        }
    }

    fn resolve_value_anchor(&self, anchor: ValueAnchor) -> ModelResult<(ElementId, FeatureId, usize)> {
        match anchor {
            ValueAnchor::Before(sibling) | ValueAnchor::After(sibling) => {
                let leaf = self
                    .store
                    .value(sibling)
                    .ok_or(ModelError::ValueNotFound(sibling))?;
                let position = self
                    .store
                    .values(leaf.element, leaf.feature)
                    .iter()
                    .position(|id| *id == sibling)
                    .ok_or(ModelError::ValueNotFound(sibling))?;
                let offset = usize::from(matches!(anchor, ValueAnchor::After(_)));
                Ok((leaf.element, leaf.feature, position + offset))
            }
            ValueAnchor::Top { element, feature } | ValueAnchor::Bottom { element, feature } => {
                if !self.store.contains(element) {
                    return Err(ModelError::ElementNotFound(element));
                }
                let len = match self.store.slot(element, feature) {
                    Some(Slot::Values(values)) => values.len(),
                    Some(Slot::Elements(_)) => {
                        return Err(ModelError::invalid_anchor("containment slots hold elements"));
                    }
                    None => {
                        return Err(ModelError::invalid_anchor(format!(
                            "feature {feature} is not declared by the element's class"
                        )));
                    }
                };
                let position = match anchor {
                    ValueAnchor::Top { .. } => 0,
                    _ => len,
                };
                Ok((element, feature, position))
            }
        }
    }
}
