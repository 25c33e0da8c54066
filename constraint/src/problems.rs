//! Problem storage.
//!
//! Problems belong to an element or to one feature slot of an element. Each
//! check of an element replaces everything recorded for it.

use std::collections::{BTreeMap, HashMap};
use trellis_core::{ElementId, FeatureId};

/// A diagnostic attached to an element or one of its feature slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub element: ElementId,
    /// `None` for element-level problems.
    pub feature: Option<FeatureId>,
    pub message: String,
}

impl Problem {
    pub fn on_element(element: ElementId, message: impl Into<String>) -> Self {
        Self {
            element,
            feature: None,
            message: message.into(),
        }
    }

    pub fn on_feature(element: ElementId, feature: FeatureId, message: impl Into<String>) -> Self {
        Self {
            element,
            feature: Some(feature),
            message: message.into(),
        }
    }
}

/// Everything found on one visit of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementProblems {
    pub element: Vec<String>,
    pub features: BTreeMap<FeatureId, Vec<String>>,
}

impl ElementProblems {
    pub fn is_empty(&self) -> bool {
        self.element.is_empty() && self.features.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.element.len() + self.features.values().map(Vec::len).sum::<usize>()
    }
}

/// Problems of all elements.
#[derive(Debug, Clone, Default)]
pub struct ProblemStore {
    problems: HashMap<ElementId, ElementProblems>,
}

impl ProblemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all problems of an element.
    pub fn replace(&mut self, element: ElementId, mut problems: ElementProblems) {
        problems.features.retain(|_, messages| !messages.is_empty());
        if problems.is_empty() {
            self.problems.remove(&element);
        } else {
            self.problems.insert(element, problems);
        }
    }

    pub fn clear_element(&mut self, element: ElementId) {
        self.problems.remove(&element);
    }

    pub fn clear(&mut self) {
        self.problems.clear();
    }

    pub fn element_problems(&self, element: ElementId) -> &[String] {
        self.problems
            .get(&element)
            .map(|problems| problems.element.as_slice())
            .unwrap_or_default()
    }

    pub fn feature_problems(&self, element: ElementId, feature: FeatureId) -> &[String] {
        self.problems
            .get(&element)
            .and_then(|problems| problems.features.get(&feature))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether an element and all its slots are free of problems.
    pub fn is_clean(&self, element: ElementId) -> bool {
        !self.problems.contains_key(&element)
    }

    /// Total number of problems.
    pub fn len(&self) -> usize {
        self.problems.values().map(ElementProblems::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// All problems, ordered by element handle then feature.
    pub fn all(&self) -> Vec<Problem> {
        let mut elements: Vec<_> = self.problems.keys().copied().collect();
        elements.sort();

        let mut result = Vec::new();
        for element in elements {
            let Some(problems) = self.problems.get(&element) else {
                continue;
            };
            result.extend(
                problems
                    .element
                    .iter()
                    .map(|message| Problem::on_element(element, message.clone())),
            );
            for (feature, messages) in &problems.features {
                result.extend(
                    messages
                        .iter()
                        .map(|message| Problem::on_feature(element, *feature, message.clone())),
                );
            }
        }
        result
    }
}
