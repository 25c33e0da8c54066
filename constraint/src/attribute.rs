//! Allowed-value predicates for attribute literals.

use crate::ConstraintResult;
use regex_lite::Regex;
use trellis_metamodel::{DataType, FeatureDef};

pub const INTEGER_PATTERN: &str = r"^(-?[1-9]\d*|0)$";
pub const FLOAT_PATTERN: &str = r"^(-?[1-9]\d*|0)(\.\d+)?$";

const BOOLEAN_LITERALS: [&str; 2] = ["true", "false"];

/// Description of the values an attribute accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOptions {
    /// One of a fixed set of literals (enums and booleans).
    Literals(Vec<String>),
    /// Any text matching a pattern (integers and floats).
    Pattern(&'static str),
    /// Free text.
    Any,
}

/// Compiled value predicates.
#[derive(Debug, Clone)]
pub struct ValueValidator {
    integer: Regex,
    float: Regex,
}

impl ValueValidator {
    pub fn new() -> ConstraintResult<Self> {
        Ok(Self {
            integer: Regex::new(INTEGER_PATTERN)?,
            float: Regex::new(FLOAT_PATTERN)?,
        })
    }

    /// Check an attribute literal against the attribute's type.
    ///
    /// Non-attribute features accept anything.
    pub fn is_valid_value(&self, feature: &FeatureDef, text: &str) -> bool {
        match feature.data_type() {
            Some(DataType::Enum { literals, .. }) => literals.iter().any(|literal| literal == text),
            Some(DataType::Boolean) => BOOLEAN_LITERALS.contains(&text),
            Some(DataType::Integer) => self.integer.is_match(text),
            Some(DataType::Float) => self.float.is_match(text),
            Some(DataType::Text) | None => true,
        }
    }
}

/// What values an attribute accepts, for completion and hints.
pub fn attribute_options(feature: &FeatureDef) -> AttributeOptions {
    match feature.data_type() {
        Some(DataType::Enum { literals, .. }) => AttributeOptions::Literals(literals.clone()),
        Some(DataType::Boolean) => {
            AttributeOptions::Literals(BOOLEAN_LITERALS.iter().map(|literal| literal.to_string()).collect())
        }
        Some(DataType::Integer) => AttributeOptions::Pattern(INTEGER_PATTERN),
        Some(DataType::Float) => AttributeOptions::Pattern(FLOAT_PATTERN),
        Some(DataType::Text) | None => AttributeOptions::Any,
    }
}
