//! Constraint checker settings.

use serde::Deserialize;

/// Number of elements checked per scan step.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckerOptions {
    /// Classes allowed at root level; `None` allows every class.
    pub root_classes: Option<Vec<String>>,
    /// Classes whose instances may share an identifier.
    pub allow_duplicates: Vec<String>,
    /// Name of the local model's own module in the external index.
    pub external_module: Option<String>,
    /// Rescan after every committed change.
    pub automatic_checking: bool,
    pub chunk_size: usize,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            root_classes: None,
            allow_duplicates: Vec::new(),
            external_module: None,
            automatic_checking: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl CheckerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.root_classes = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_allow_duplicates<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_duplicates = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_external_module(mut self, module: impl Into<String>) -> Self {
        self.external_module = Some(module.into());
        self
    }

    pub fn with_automatic_checking(mut self, automatic: bool) -> Self {
        self.automatic_checking = automatic;
        self
    }

    /// Set the scan chunk size; zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}
