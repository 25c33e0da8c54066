//! Metamodel definition types.

use serde::Deserialize;
use std::collections::BTreeSet;
use trellis_core::{ClassId, FeatureId};

/// The closed set of feature kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Primitive values held as text.
    Attribute,
    /// Non-owning edge, held as the identifier text of the target.
    Reference,
    /// Ownership edge to child elements.
    Containment,
}

/// Primitive value types an attribute can have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// Free text.
    Text,
    Integer,
    Float,
    Boolean,
    /// Enumeration with a fixed set of literals.
    Enum { name: String, literals: Vec<String> },
}

impl DataType {
    /// Name as used in feature declarations.
    pub fn name(&self) -> &str {
        match self {
            DataType::Text => "String",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::Boolean => "Boolean",
            DataType::Enum { name, .. } => name,
        }
    }
}

/// Declared type of a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureType {
    /// Target class of a reference or containment.
    Class(ClassId),
    /// Primitive type of an attribute.
    Data(DataType),
}

/// Class definition.
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Handle of this class.
    pub id: ClassId,
    /// Class name.
    pub name: String,
    /// Whether this class may be instantiated.
    pub is_abstract: bool,
    /// Optional documentation.
    pub documentation: Option<String>,
    /// Direct super-types, in declaration order.
    pub super_ids: Vec<ClassId>,
    /// Features declared by this class itself (not inherited).
    pub features: Vec<FeatureId>,
}

/// Feature definition.
#[derive(Debug, Clone)]
pub struct FeatureDef {
    /// Handle of this feature.
    pub id: FeatureId,
    /// Class declaring this feature.
    pub owner: ClassId,
    /// Feature name.
    pub name: String,
    /// Attribute, reference or containment.
    pub kind: FeatureKind,
    /// Declared value/target type.
    pub feature_type: FeatureType,
    /// Minimum number of values.
    pub lower_limit: usize,
    /// Maximum number of values, `None` when unbounded.
    pub upper_limit: Option<usize>,
    /// Optional documentation.
    pub documentation: Option<String>,
}

impl FeatureDef {
    pub fn is_attribute(&self) -> bool {
        self.kind == FeatureKind::Attribute
    }

    pub fn is_reference(&self) -> bool {
        self.kind == FeatureKind::Reference
    }

    pub fn is_containment(&self) -> bool {
        self.kind == FeatureKind::Containment
    }

    /// Target class for references and containments.
    pub fn target_class(&self) -> Option<ClassId> {
        match &self.feature_type {
            FeatureType::Class(id) => Some(*id),
            FeatureType::Data(_) => None,
        }
    }

    /// Primitive type for attributes.
    pub fn data_type(&self) -> Option<&DataType> {
        match &self.feature_type {
            FeatureType::Data(data_type) => Some(data_type),
            FeatureType::Class(_) => None,
        }
    }

    /// Whether `count` values exceed the upper limit.
    pub fn exceeds_upper(&self, count: usize) -> bool {
        self.upper_limit.is_some_and(|limit| count > limit)
    }
}

/// Precomputed subtype relationships.
///
/// Class handles are dense, so the sets are indexed by `ClassId::index`.
#[derive(Debug, Default)]
pub struct SubtypeIndex {
    /// For each class, the set of all its subtypes (transitive).
    subtypes: Vec<BTreeSet<ClassId>>,
    /// For each class, the set of all its supertypes (transitive).
    supertypes: Vec<BTreeSet<ClassId>>,
}

impl SubtypeIndex {
    /// Build the subtype index from class definitions.
    ///
    /// The inheritance graph must be acyclic.
    pub fn build(classes: &[ClassDef]) -> Self {
        let mut index = Self {
            subtypes: vec![BTreeSet::new(); classes.len()],
            supertypes: vec![BTreeSet::new(); classes.len()],
        };

        for class in classes {
            let mut stack: Vec<ClassId> = class.super_ids.clone();
            while let Some(super_id) = stack.pop() {
                if index.supertypes[class.id.index()].insert(super_id) {
                    index.subtypes[super_id.index()].insert(class.id);
                    stack.extend(classes[super_id.index()].super_ids.iter().copied());
                }
            }
        }

        index
    }

    /// Check if `sub` is `super_type` or one of its subtypes.
    pub fn is_subtype(&self, sub: ClassId, super_type: ClassId) -> bool {
        if sub == super_type {
            return true;
        }
        self.supertypes
            .get(sub.index())
            .is_some_and(|set| set.contains(&super_type))
    }

    /// Get all subtypes of a class (not including the class itself).
    pub fn subtypes(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.subtypes
            .get(class.index())
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get all supertypes of a class (not including the class itself).
    pub fn supertypes(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.supertypes
            .get(class.index())
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}
