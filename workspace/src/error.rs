//! Workspace error types.

use thiserror::Error;
use trellis_constraint::ConstraintError;
use trellis_core::ModelError;
use trellis_ident::ExternalIndexError;
use trellis_metamodel::MetamodelError;

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Workspace errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("metamodel error: {0}")]
    Metamodel(#[from] MetamodelError),

    #[error("constraint setup error: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("external index error: {0}")]
    ExternalIndex(#[from] ExternalIndexError),

    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("unknown class: {name}")]
    UnknownClass { name: String },

    #[error("unknown feature: {feature} on class {class}")]
    UnknownFeature { class: String, feature: String },
}

impl WorkspaceError {
    pub fn unknown_class(name: impl Into<String>) -> Self {
        Self::UnknownClass { name: name.into() }
    }

    pub fn unknown_feature(class: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::UnknownFeature {
            class: class.into(),
            feature: feature.into(),
        }
    }
}
