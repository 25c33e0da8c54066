//! Read-only lookup of elements that live outside the local model.
//!
//! The index is a list of modules, each a tree of `{ _class, name, elements }`
//! entries. An external identifier is the separator-joined path of entry
//! names from the module root, e.g. `/Pkg/Foo`.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use trellis_metamodel::Metamodel;

const SEPARATOR: char = '/';

/// Errors loading an external index.
#[derive(Debug, Error)]
pub enum ExternalIndexError {
    #[error("invalid index: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where an external identifier points.
///
/// Classes travel by name, so a provider and a checker built from separate
/// metamodel instances still agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    pub class_name: String,
    pub module: String,
}

/// One entry of the flattened index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalElement {
    pub identifier: String,
    /// Class name as written in the index; may be unknown to the metamodel.
    pub class_name: String,
    pub module: String,
}

/// Source of identifiers for elements outside the local model.
pub trait ExternalIdentifierProvider {
    /// Resolve an identifier, skipping the module named `ignore_module`.
    fn element_info(&self, identifier: &str, ignore_module: Option<&str>) -> Option<ElementInfo>;

    /// Identifiers of all elements of the named class or one of its subtypes.
    fn identifiers(&self, class_name: &str) -> Vec<String>;

    /// Every indexed element.
    fn all_element_info(&self) -> Vec<ExternalElement>;
}

/// A module of the external index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexModule {
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub elements: Vec<IndexEntry>,
}

/// An element of the external index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "_class")]
    pub class: String,
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub elements: Vec<IndexEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

/// External provider backed by an in-memory index.
#[derive(Debug, Clone)]
pub struct IndexedExternalProvider {
    metamodel: Arc<Metamodel>,
    modules: Vec<IndexModule>,
}

impl IndexedExternalProvider {
    pub fn new(metamodel: Arc<Metamodel>, modules: Vec<IndexModule>) -> Self {
        Self { metamodel, modules }
    }

    /// Load an index from JSON: a list of modules (or a single module).
    pub fn from_json(metamodel: Arc<Metamodel>, text: &str) -> Result<Self, ExternalIndexError> {
        let modules: OneOrMany<IndexModule> = serde_json::from_str(text)?;
        let modules = match modules {
            OneOrMany::Many(modules) => modules,
            OneOrMany::One(module) => vec![module],
        };
        tracing::debug!(modules = modules.len(), "external index loaded");
        Ok(Self::new(metamodel, modules))
    }

    pub fn modules(&self) -> &[IndexModule] {
        &self.modules
    }
}

impl ExternalIdentifierProvider for IndexedExternalProvider {
    fn element_info(&self, identifier: &str, ignore_module: Option<&str>) -> Option<ElementInfo> {
        let segments: Vec<&str> = identifier.split(SEPARATOR).collect();
        self.modules
            .iter()
            .filter(|module| ignore_module != Some(module.name.as_str()))
            .find_map(|module| {
                let entry = lookup(&module.elements, &segments)?;
                self.metamodel.class_id(&entry.class)?;
                Some(ElementInfo {
                    class_name: entry.class.clone(),
                    module: module.name.clone(),
                })
            })
    }

    fn identifiers(&self, class_name: &str) -> Vec<String> {
        let Some(class) = self.metamodel.class_id(class_name) else {
            return Vec::new();
        };
        let names: BTreeSet<&str> = self
            .metamodel
            .allowed_types(class)
            .map(|id| self.metamodel.class_name(id))
            .collect();

        let mut result = Vec::new();
        for module in &self.modules {
            walk(&module.elements, String::new(), &mut |path: &str, entry: &IndexEntry| {
                if names.contains(entry.class.as_str()) {
                    result.push(path.to_string());
                }
            });
        }
        result
    }

    fn all_element_info(&self) -> Vec<ExternalElement> {
        let mut result = Vec::new();
        for module in &self.modules {
            walk(&module.elements, String::new(), &mut |path: &str, entry: &IndexEntry| {
                result.push(ExternalElement {
                    identifier: path.to_string(),
                    class_name: entry.class.clone(),
                    module: module.name.clone(),
                });
            });
        }
        result
    }
}

/// Follow path segments down the entry tree.
///
/// Empty segments before a name are skipped, so leading and doubled
/// separators are tolerated; a trailing separator is not.
fn lookup<'a>(entries: &'a [IndexEntry], segments: &[&str]) -> Option<&'a IndexEntry> {
    let start = segments.iter().position(|segment| !segment.is_empty())?;
    let entry = entries.iter().find(|entry| entry.name == segments[start])?;
    let rest = &segments[start + 1..];
    if rest.is_empty() {
        Some(entry)
    } else {
        lookup(&entry.elements, rest)
    }
}

/// Depth-first pre-order walk, calling `visit` with each entry's full path.
fn walk(entries: &[IndexEntry], path: String, visit: &mut dyn FnMut(&str, &IndexEntry)) {
    for entry in entries {
        let entry_path = format!("{path}{SEPARATOR}{}", entry.name);
        visit(&entry_path, entry);
        walk(&entry.elements, entry_path, visit);
    }
}
