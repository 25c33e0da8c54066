//! Trellis Metamodel
//!
//! Static description of classes and their features. Read-only once built.
//!
//! Responsibilities:
//! - Class lookup by name and handle
//! - Inherited feature lists per class
//! - Precomputed transitive subtype sets
//! - Validation of the schema while building (cycles, feature targets, limits)

mod builder;
mod metamodel;
mod schema;
mod types;

pub use builder::{ClassBuilder, FeatureSpec, MetamodelBuilder, MetamodelError};
pub use metamodel::Metamodel;
pub use types::{ClassDef, DataType, FeatureDef, FeatureKind, FeatureType, SubtypeIndex};
