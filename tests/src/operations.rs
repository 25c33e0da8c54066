//! Reusable step actions.
//!
//! Elements are addressed by their qualified identifier, resolved against
//! the workspace at the time the action runs.

use trellis_core::{ElementId, Record, RecordBatch};
use trellis_graph::{ElementAnchor, SlotRef, ValueAnchor};
use trellis_workspace::Workspace;

use crate::error::{ScenarioError, ScenarioResult};

/// A step action.
pub type Action = Box<dyn Fn(&mut Workspace) -> ScenarioResult<()>>;

/// Wrap a closure as a step action.
pub fn action(f: impl Fn(&mut Workspace) -> ScenarioResult<()> + 'static) -> Action {
    Box::new(f)
}

/// Resolve an identifier bound to exactly one element.
pub fn resolve(ws: &Workspace, identifier: &str) -> ScenarioResult<ElementId> {
    match ws.get_element(identifier) {
        Some(binding) => binding.single().ok_or_else(|| ScenarioError::ambiguous(identifier)),
        None => Err(ScenarioError::unresolved(identifier)),
    }
}

/// Resolve an identifier to all elements bound to it.
pub fn resolve_all(ws: &Workspace, identifier: &str) -> ScenarioResult<Vec<ElementId>> {
    ws.get_element(identifier)
        .map(|binding| binding.elements().to_vec())
        .ok_or_else(|| ScenarioError::unresolved(identifier))
}

fn slot(ws: &Workspace, parent: &str, feature: &str) -> ScenarioResult<SlotRef> {
    let element = resolve(ws, parent)?;
    let feature = ws.feature_of(element, feature)?;
    Ok(SlotRef::Feature { element, feature })
}

/// Do nothing; the step only asserts.
pub fn nothing() -> Action {
    action(|_| Ok(()))
}

/// Append records at root level.
pub fn create_root(data: impl Into<RecordBatch>) -> Action {
    let data = data.into();
    action(move |ws| {
        ws.create_element(ElementAnchor::Bottom(SlotRef::Root), data.clone())?;
        Ok(())
    })
}

/// Append a record to a containment feature of an element.
pub fn create_in(parent: &str, feature: &str, record: Record) -> Action {
    let (parent, feature) = (parent.to_string(), feature.to_string());
    action(move |ws| {
        let slot = slot(ws, &parent, &feature)?;
        ws.create_element(ElementAnchor::Bottom(slot), record.clone())?;
        Ok(())
    })
}

/// Remove elements of one parent slot.
pub fn remove(identifiers: &[&str]) -> Action {
    let identifiers: Vec<String> = identifiers.iter().map(|id| id.to_string()).collect();
    action(move |ws| {
        let elements = identifiers
            .iter()
            .map(|id| resolve(ws, id))
            .collect::<ScenarioResult<Vec<_>>>()?;
        ws.remove_element(&elements)?;
        Ok(())
    })
}

/// Set the first value of a feature, creating it when the slot is empty.
pub fn set_value(identifier: &str, feature: &str, text: &str) -> Action {
    let (identifier, feature, text) = (identifier.to_string(), feature.to_string(), text.to_string());
    action(move |ws| {
        let element = resolve(ws, &identifier)?;
        let feature = ws.feature_of(element, &feature)?;
        match ws.store().values(element, feature).first().copied() {
            Some(value) => ws.change_value(value, text.clone())?,
            None => {
                ws.create_value(ValueAnchor::Bottom { element, feature }, text.clone())?;
            }
        }
        Ok(())
    })
}

/// Append a value to a feature.
pub fn add_value(identifier: &str, feature: &str, text: &str) -> Action {
    let (identifier, feature, text) = (identifier.to_string(), feature.to_string(), text.to_string());
    action(move |ws| {
        let element = resolve(ws, &identifier)?;
        let feature = ws.feature_of(element, &feature)?;
        ws.create_value(ValueAnchor::Bottom { element, feature }, text.clone())?;
        Ok(())
    })
}

/// Remove every value of a feature.
pub fn clear_values(identifier: &str, feature: &str) -> Action {
    let (identifier, feature) = (identifier.to_string(), feature.to_string());
    action(move |ws| {
        let element = resolve(ws, &identifier)?;
        let feature = ws.feature_of(element, &feature)?;
        let values = ws.store().values(element, feature).to_vec();
        for value in values {
            ws.remove_value(value)?;
        }
        Ok(())
    })
}

/// Replace the whole model by records in JSON form.
pub fn import_json(text: &str) -> Action {
    let text = text.to_string();
    action(move |ws| {
        ws.import_json(&text)?;
        Ok(())
    })
}

/// Schedule a full rescan.
pub fn check_all() -> Action {
    action(|ws| {
        ws.update_all_problems();
        Ok(())
    })
}
