//! Error types for the scenario framework.

use thiserror::Error;
use trellis_metamodel::MetamodelError;
use trellis_workspace::WorkspaceError;

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when running scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Failed to load the metamodel.
    #[error("failed to load metamodel for scenario '{scenario}': {source}")]
    MetamodelLoad {
        scenario: String,
        source: MetamodelError,
    },

    /// No metamodel was given.
    #[error("metamodel not specified for scenario '{scenario}'")]
    MissingMetamodel { scenario: String },

    /// Failed to set up the workspace.
    #[error("setup of scenario '{scenario}' failed: {message}")]
    Setup { scenario: String, message: String },

    /// Assertion failed.
    #[error("assertion failed for step '{step}': {message}")]
    AssertionFailed { step: String, message: String },

    /// An identifier used by a step is not bound.
    #[error("identifier '{identifier}' is not bound")]
    Unresolved { identifier: String },

    /// An identifier used by a step is bound to several elements.
    #[error("identifier '{identifier}' is ambiguous")]
    Ambiguous { identifier: String },

    /// Workspace error raised by a step.
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
}

impl ScenarioError {
    pub fn setup(scenario: impl Into<String>, message: impl ToString) -> Self {
        Self::Setup {
            scenario: scenario.into(),
            message: message.to_string(),
        }
    }

    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn unresolved(identifier: impl Into<String>) -> Self {
        Self::Unresolved {
            identifier: identifier.into(),
        }
    }

    pub fn ambiguous(identifier: impl Into<String>) -> Self {
        Self::Ambiguous {
            identifier: identifier.into(),
        }
    }
}
