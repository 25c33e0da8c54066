//! Conversion between records and element subtrees.

use crate::{ElementStore, Slot, SlotRef};
use trellis_core::{ElementId, FeatureId, FeatureData, ModelError, ModelResult, Record, RecordItem};
use trellis_metamodel::{FeatureDef, Metamodel};

/// Check a record tree against the metamodel without touching the store.
pub fn validate_record(metamodel: &Metamodel, record: &Record) -> ModelResult<()> {
    let class = metamodel
        .class_id(&record.class)
        .ok_or_else(|| ModelError::unknown_class(&record.class))?;

    for (name, data) in &record.features {
        let feature = metamodel
            .feature_by_name(class, name)
            .ok_or_else(|| ModelError::unknown_feature(&record.class, name))?;
        for item in data.items() {
            match item {
                RecordItem::Record(child) if feature.is_containment() => {
                    validate_record(metamodel, child)?;
                }
                RecordItem::Record(_) => {
                    return Err(ModelError::malformed(format!(
                        "feature '{}' of class '{}' expects text values",
                        name, record.class
                    )));
                }
                RecordItem::Text(_) if feature.is_containment() => {
                    return Err(ModelError::malformed(format!(
                        "containment '{}' of class '{}' expects nested records",
                        name, record.class
                    )));
                }
                RecordItem::Text(_) => {}
            }
        }
    }

    Ok(())
}

/// Build a detached element subtree from a validated record.
pub(crate) fn materialize(store: &mut ElementStore, record: &Record, owner: SlotRef) -> ModelResult<ElementId> {
    let class = store
        .metamodel()
        .class_id(&record.class)
        .ok_or_else(|| ModelError::unknown_class(&record.class))?;
    let element = store.alloc_element(class, owner);

    for (name, data) in &record.features {
        let feature = store
            .metamodel()
            .feature_by_name(class, name)
            .map(|feature| feature.id)
            .ok_or_else(|| ModelError::unknown_feature(&record.class, name))?;

        for item in data.items() {
            match item {
                RecordItem::Record(child) => {
                    let child = materialize(store, child, SlotRef::Feature { element, feature })?;
                    push_child(store, element, feature, child)?;
                }
                RecordItem::Text(text) => {
                    let value = store.alloc_value(element, feature, text.clone());
                    store
                        .slot_values_mut(element, feature)
                        .ok_or_else(|| ModelError::malformed(format!("'{name}' holds no values")))?
                        .push(value);
                }
            }
        }
    }

    Ok(element)
}

fn push_child(store: &mut ElementStore, element: ElementId, feature: FeatureId, child: ElementId) -> ModelResult<()> {
    store
        .slot_elements_mut(SlotRef::Feature { element, feature })
        .ok_or_else(|| ModelError::invalid_anchor("feature holds no elements"))?
        .push(child);
    Ok(())
}

/// Serialize an element subtree into the record shape.
///
/// Features without values and placeholder values are omitted.
pub fn extract_record(store: &ElementStore, element: ElementId) -> ModelResult<Record> {
    let data = store
        .element(element)
        .ok_or(ModelError::ElementNotFound(element))?;
    let metamodel = store.metamodel();
    let mut record = Record::new(metamodel.class_name(data.class));

    for (feature_id, slot) in metamodel.all_features(data.class).iter().zip(data.slots()) {
        let feature: &FeatureDef = metamodel.feature(*feature_id);
        let items = match slot {
            Slot::Elements(children) => children
                .iter()
                .map(|child| extract_record(store, *child).map(RecordItem::Record))
                .collect::<ModelResult<Vec<_>>>()?,
            Slot::Values(_) => store
                .value_texts(element, feature.id)
                .map(|text| RecordItem::Text(text.to_string()))
                .collect(),
        };
        if let Some(data) = FeatureData::from_items(items) {
            record.features.insert(feature.name.clone(), data);
        }
    }

    Ok(record)
}
