//! Identifier computation settings.

use serde::Deserialize;
use std::fmt;
use std::rc::Rc;
use trellis_core::ElementId;
use trellis_graph::ElementStore;

/// How qualified names are assembled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentifierOptions {
    /// Attribute holding an element's own (unqualified) name.
    pub name_attribute: String,
    /// Separator between name fragments.
    pub separator: String,
    /// Start qualified names with the separator.
    pub leading_separator: bool,
}

impl Default for IdentifierOptions {
    fn default() -> Self {
        Self {
            name_attribute: "name".to_string(),
            separator: "/".to_string(),
            leading_separator: true,
        }
    }
}

impl IdentifierOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name_attribute(mut self, name: impl Into<String>) -> Self {
        self.name_attribute = name.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_leading_separator(mut self, leading: bool) -> Self {
        self.leading_separator = leading;
        self
    }

    /// Join a prefix and a fragment into a qualified name.
    pub fn qualify(&self, prefix: &str, fragment: &str) -> String {
        if prefix.is_empty() && !self.leading_separator {
            fragment.to_string()
        } else {
            format!("{prefix}{}{fragment}", self.separator)
        }
    }
}

type FragmentFn = dyn Fn(&ElementStore, ElementId) -> Option<String>;

/// Computes the unqualified name fragment of an element.
///
/// An empty or missing fragment leaves the element unnamed.
#[derive(Clone)]
pub struct NameFragment(Rc<FragmentFn>);

impl NameFragment {
    /// Use the first non-placeholder value of the given attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        let name = name.into();
        Self(Rc::new(move |store, element| {
            store.attribute_text(element, &name).map(str::to_string)
        }))
    }

    /// Use a custom function.
    pub fn custom(f: impl Fn(&ElementStore, ElementId) -> Option<String> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn compute(&self, store: &ElementStore, element: ElementId) -> Option<String> {
        (self.0)(store, element).filter(|fragment| !fragment.is_empty())
    }
}

impl fmt::Debug for NameFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NameFragment(..)")
    }
}
