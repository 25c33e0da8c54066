//! Problem texts produced by the constraint engine.
//!
//! Kept in one place so hosts and tests can match on them.

/// Problem: a reference value matches no local or external identifier.
pub const REFERENCE_UNRESOLVED: &str = "can not resolve reference";

/// Problem: a reference value matches more than one target.
pub const REFERENCE_AMBIGUOUS: &str = "multiple targets for reference";

/// Problem: an attribute literal is not allowed by the attribute's type.
pub const VALUE_NOT_ALLOWED: &str = "value not allowed";

pub fn element_not_allowed(class: &str) -> String {
    format!("element of class '{class}' not allowed")
}

pub fn class_is_abstract(class: &str) -> String {
    format!("class '{class}' is abstract")
}

pub fn duplicate_identifier(identifier: &str) -> String {
    format!("duplicate identifier '{identifier}'")
}

pub fn duplicate_identifier_external(identifier: &str, module: Option<&str>) -> String {
    format!(
        "duplicate identifier '{identifier}', also defined in {}",
        module.unwrap_or("external module")
    )
}

pub fn only_one_element(feature: &str) -> String {
    format!("only one element may be specified as '{feature}'")
}

pub fn only_one_value(feature: &str) -> String {
    format!("only one value may be specified as '{feature}'")
}

pub fn above_upper_limit(limit: usize) -> String {
    format!("above upper limit of '{limit}'")
}

pub fn must_be_specified(feature: &str) -> String {
    format!("'{feature}' must be specified")
}

pub fn below_lower_limit(limit: usize) -> String {
    format!("below lower limit of '{limit}'")
}

pub fn reference_not_allowed(class: &str) -> String {
    format!("reference to class '{class}' not allowed")
}
