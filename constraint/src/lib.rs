//! Trellis Constraint Engine
//!
//! Validates a model against its metamodel and custom per-feature
//! constraints, keeping a per-element/per-feature problem list current
//! through a chunked, restartable full-tree scan.

mod attribute;
mod checker;
mod custom;
mod error;
mod options;
mod problems;
mod scan;

pub use attribute::{attribute_options, AttributeOptions, ValueValidator, FLOAT_PATTERN, INTEGER_PATTERN};
pub use checker::{CheckContext, ConstraintChecker};
pub use custom::{ConstraintSet, FeatureConstraint, Message, Target};
pub use error::{ConstraintError, ConstraintResult};
pub use options::{CheckerOptions, DEFAULT_CHUNK_SIZE};
pub use problems::{ElementProblems, Problem, ProblemStore};
pub use scan::{ScanState, ScanStatus};
