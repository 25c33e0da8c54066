//! Custom per-(class, feature) value constraints.

use crate::{ConstraintError, ConstraintResult};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use trellis_core::{ClassId, ElementId, FeatureId};
use trellis_graph::ElementStore;
use trellis_metamodel::Metamodel;

/// The value a custom constraint is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// A containment child, or the local element a reference resolves to.
    Element(ElementId),
    /// An attribute literal.
    Text(&'a str),
}

type Predicate = dyn Fn(&ElementStore, ElementId, Target<'_>) -> bool;
type MessageFn = dyn Fn(&ElementStore, ElementId, Target<'_>) -> String;

/// Problem text of a failing constraint.
#[derive(Clone)]
pub enum Message {
    Static(String),
    Computed(Rc<MessageFn>),
}

/// A predicate over the values of one feature of one class.
///
/// Applies to instances of exactly `class`; subclasses register their own.
#[derive(Clone)]
pub struct FeatureConstraint {
    class: String,
    feature: String,
    predicate: Rc<Predicate>,
    message: Message,
}

impl FeatureConstraint {
    pub fn new(
        class: impl Into<String>,
        feature: impl Into<String>,
        predicate: impl Fn(&ElementStore, ElementId, Target<'_>) -> bool + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            feature: feature.into(),
            predicate: Rc::new(predicate),
            message: Message::Static(message.into()),
        }
    }

    /// Compute the problem text from the failing value.
    pub fn with_message_fn(
        mut self,
        message: impl Fn(&ElementStore, ElementId, Target<'_>) -> String + 'static,
    ) -> Self {
        self.message = Message::Computed(Rc::new(message));
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn check(&self, store: &ElementStore, element: ElementId, target: Target<'_>) -> bool {
        (self.predicate)(store, element, target)
    }

    pub fn message(&self, store: &ElementStore, element: ElementId, target: Target<'_>) -> String {
        match &self.message {
            Message::Static(text) => text.clone(),
            Message::Computed(f) => f(store, element, target),
        }
    }
}

impl fmt::Debug for FeatureConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureConstraint")
            .field("class", &self.class)
            .field("feature", &self.feature)
            .finish_non_exhaustive()
    }
}

/// Registered constraints indexed by (class, feature).
#[derive(Debug, Default)]
pub struct ConstraintSet {
    by_feature: HashMap<(ClassId, FeatureId), Vec<FeatureConstraint>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constraint, resolving its class and feature names.
    pub fn add(&mut self, metamodel: &Metamodel, constraint: FeatureConstraint) -> ConstraintResult<()> {
        let class = metamodel
            .class_id(&constraint.class)
            .ok_or_else(|| ConstraintError::unknown_class(&constraint.class))?;
        let feature = metamodel
            .feature_by_name(class, &constraint.feature)
            .map(|feature| feature.id)
            .ok_or_else(|| ConstraintError::unknown_feature(&constraint.class, &constraint.feature))?;
        self.by_feature.entry((class, feature)).or_default().push(constraint);
        Ok(())
    }

    pub fn get(&self, class: ClassId, feature: FeatureId) -> &[FeatureConstraint] {
        self.by_feature
            .get(&(class, feature))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_feature.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_feature.is_empty()
    }
}
