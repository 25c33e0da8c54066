//! Structural error types for Trellis.
//!
//! These are the only failures a mutation can report. Validity problems
//! (multiplicity, types, duplicates, references) are never errors; they are
//! collected by the constraint engine as diagnostics.

use crate::{ElementId, ValueId};
use thiserror::Error;

/// Errors that can occur during model graph operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Class name does not resolve in the metamodel.
    #[error("Unknown class: {name}")]
    UnknownClass { name: String },

    /// Feature name is not declared by the class (or its super-types).
    #[error("Unknown feature: {feature} on class {class}")]
    UnknownFeature { class: String, feature: String },

    /// Record does not have the shape its class requires.
    #[error("Malformed record: {message}")]
    MalformedRecord { message: String },

    /// Element handle is stale or was never allocated.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// Value handle is stale or was never allocated.
    #[error("Value not found: {0}")]
    ValueNotFound(ValueId),

    /// The anchor of an insert does not accept the inserted kind of node.
    #[error("Invalid anchor: {message}")]
    InvalidAnchor { message: String },

    /// A removal set spans more than one slot.
    #[error("Elements to remove must share one parent slot")]
    MixedParents,

    /// Record text could not be parsed.
    #[error("Invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn unknown_class(name: impl Into<String>) -> Self {
        Self::UnknownClass { name: name.into() }
    }

    pub fn unknown_feature(class: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::UnknownFeature {
            class: class.into(),
            feature: feature.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    pub fn invalid_anchor(message: impl Into<String>) -> Self {
        Self::InvalidAnchor {
            message: message.into(),
        }
    }
}

/// Result type for model graph operations.
pub type ModelResult<T> = Result<T, ModelError>;
