//! The Metamodel - immutable schema lookup.

use crate::{ClassDef, FeatureDef, MetamodelError, SubtypeIndex};
use std::collections::HashMap;
use trellis_core::{ClassId, FeatureId};

/// The Metamodel provides runtime lookup of class and feature definitions.
/// It is immutable after construction.
#[derive(Debug)]
pub struct Metamodel {
    /// Class definitions, indexed by `ClassId`.
    classes: Vec<ClassDef>,
    /// Class lookup by name.
    class_names: HashMap<String, ClassId>,
    /// Feature definitions, indexed by `FeatureId`.
    features: Vec<FeatureDef>,
    /// For each class, its own and inherited features (super-types first).
    all_features: Vec<Vec<FeatureId>>,
    /// Precomputed subtype relationships.
    subtype_index: SubtypeIndex,
}

impl Metamodel {
    /// Create a metamodel (use MetamodelBuilder for construction).
    pub(crate) fn new(
        classes: Vec<ClassDef>,
        class_names: HashMap<String, ClassId>,
        features: Vec<FeatureDef>,
        all_features: Vec<Vec<FeatureId>>,
        subtype_index: SubtypeIndex,
    ) -> Self {
        Self {
            classes,
            class_names,
            features,
            all_features,
            subtype_index,
        }
    }

    /// Load a metamodel from its JSON description.
    pub fn from_json(text: &str) -> Result<Self, MetamodelError> {
        crate::schema::load(text)
    }

    // ==================== Class Lookups ====================

    /// Get a class definition by handle.
    ///
    /// Handles are only minted by this metamodel; a foreign handle panics.
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    /// Get a class definition by name.
    pub fn class_by_name(&self, name: &str) -> Option<&ClassDef> {
        self.class_names.get(name).map(|id| self.class(*id))
    }

    /// Get a class handle by name.
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_names.get(name).copied()
    }

    /// Get a class name by handle.
    pub fn class_name(&self, id: ClassId) -> &str {
        &self.class(id).name
    }

    /// Get all class definitions in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.iter()
    }

    /// Get the number of classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    // ==================== Feature Lookups ====================

    /// Get a feature definition by handle.
    pub fn feature(&self, id: FeatureId) -> &FeatureDef {
        &self.features[id.index()]
    }

    /// Get own and inherited features of a class, in slot order.
    pub fn all_features(&self, class: ClassId) -> &[FeatureId] {
        &self.all_features[class.index()]
    }

    /// Find a feature of a class (including inherited) by name.
    pub fn feature_by_name(&self, class: ClassId, name: &str) -> Option<&FeatureDef> {
        self.all_features(class)
            .iter()
            .map(|id| self.feature(*id))
            .find(|feature| feature.name == name)
    }

    /// Position of a feature's slot within elements of `class`.
    pub fn feature_position(&self, class: ClassId, feature: FeatureId) -> Option<usize> {
        self.all_features(class).iter().position(|id| *id == feature)
    }

    // ==================== Subtype Queries ====================

    /// Check if `sub` is `super_type` or one of its subtypes.
    pub fn is_subtype(&self, sub: ClassId, super_type: ClassId) -> bool {
        self.subtype_index.is_subtype(sub, super_type)
    }

    /// Get all subtypes of a class (not including the class itself).
    pub fn subtypes(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.subtype_index.subtypes(class)
    }

    /// Get all supertypes of a class (not including the class itself).
    pub fn supertypes(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.subtype_index.supertypes(class)
    }

    /// The class itself followed by all its subtypes.
    pub fn allowed_types(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::once(class).chain(self.subtypes(class))
    }
}
