//! Trellis Graph
//!
//! The live model: a tree of metamodel-typed elements with leaf values,
//! ordered containment, change notification and record conversion.

mod listener;
mod model;
mod record;
mod store;

pub use listener::{ListenerList, ModelChangeListener, SharedListener};
pub use model::{ElementAnchor, Model, ValueAnchor};
pub use record::{extract_record, validate_record};
pub use store::{Element, ElementStore, Elements, LeafValue, Slot, SlotRef};
