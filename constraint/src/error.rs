//! Constraint engine error types.

use thiserror::Error;

/// Result type for constraint engine setup.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Errors configuring the constraint engine.
///
/// Checking itself never fails: validity problems are diagnostics.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("Unknown class: {name}")]
    UnknownClass { name: String },

    #[error("Unknown feature: {feature} on class {class}")]
    UnknownFeature { class: String, feature: String },

    #[error("Invalid value pattern: {0}")]
    Pattern(#[from] regex_lite::Error),
}

impl ConstraintError {
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
