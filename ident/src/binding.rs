//! Reverse index from identifier to element(s).

use std::collections::HashMap;
use trellis_core::ElementId;

/// The element(s) bound to one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Single(ElementId),
    /// Collision: two or more elements share the identifier, in binding order.
    Multiple(Vec<ElementId>),
}

impl Binding {
    /// All bound elements in binding order.
    pub fn elements(&self) -> &[ElementId] {
        match self {
            Binding::Single(element) => std::slice::from_ref(element),
            Binding::Multiple(elements) => elements,
        }
    }

    /// The bound element unless the identifier collides.
    pub fn single(&self) -> Option<ElementId> {
        match self {
            Binding::Single(element) => Some(*element),
            Binding::Multiple(_) => None,
        }
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, Binding::Multiple(_))
    }

    fn bind(self, element: ElementId) -> Binding {
        match self {
            Binding::Single(first) => Binding::Multiple(vec![first, element]),
            Binding::Multiple(mut elements) => {
                elements.push(element);
                Binding::Multiple(elements)
            }
        }
    }

    fn unbind(self, element: ElementId) -> Option<Binding> {
        match self {
            Binding::Single(bound) if bound == element => None,
            Binding::Single(bound) => Some(Binding::Single(bound)),
            Binding::Multiple(mut elements) => {
                elements.retain(|bound| *bound != element);
                match elements.len() {
                    0 => None,
                    1 => Some(Binding::Single(elements[0])),
                    _ => Some(Binding::Multiple(elements)),
                }
            }
        }
    }
}

/// identifier -> Binding
#[derive(Debug, Default)]
pub struct BindingIndex {
    index: HashMap<String, Binding>,
}

impl BindingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<&Binding> {
        self.index.get(identifier)
    }

    /// Add an element to an identifier, upgrading to a collision on the second one.
    pub fn bind(&mut self, identifier: String, element: ElementId) {
        let binding = match self.index.remove(&identifier) {
            Some(existing) => existing.bind(element),
            None => Binding::Single(element),
        };
        self.index.insert(identifier, binding);
    }

    /// Remove an element from an identifier, downgrading as bindings go away.
    pub fn unbind(&mut self, identifier: &str, element: ElementId) {
        if let Some(existing) = self.index.remove(identifier) {
            if let Some(rest) = existing.unbind(element) {
                self.index.insert(identifier.to_string(), rest);
            }
        }
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
