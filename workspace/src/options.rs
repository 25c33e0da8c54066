//! Workspace settings.

use crate::WorkspaceResult;
use serde::Deserialize;
use trellis_constraint::CheckerOptions;
use trellis_ident::IdentifierOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkspaceOptions {
    pub identifiers: IdentifierOptions,
    pub checker: CheckerOptions,
    /// Maximum number of root elements; `None` is unlimited.
    pub max_root_elements: Option<usize>,
}

impl WorkspaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json(text: &str) -> WorkspaceResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_identifiers(mut self, identifiers: IdentifierOptions) -> Self {
        self.identifiers = identifiers;
        self
    }

    pub fn with_checker(mut self, checker: CheckerOptions) -> Self {
        self.checker = checker;
        self
    }

    pub fn with_max_root_elements(mut self, max: usize) -> Self {
        self.max_root_elements = Some(max);
        self
    }
}
