//! MetamodelBuilder for constructing an immutable Metamodel.
//!
//! Class and feature type names are resolved in `build`, so classes may refer
//! to classes declared after them.

use crate::{ClassDef, DataType, FeatureDef, FeatureKind, FeatureType, Metamodel, SubtypeIndex};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use trellis_core::{ClassId, FeatureId};

/// Errors that can occur during metamodel construction.
#[derive(Debug, Error)]
pub enum MetamodelError {
    #[error("Duplicate class name: {0}")]
    DuplicateClassName(String),

    #[error("Duplicate datatype name: {0}")]
    DuplicateDatatypeName(String),

    #[error("Duplicate feature {feature} on class {class}")]
    DuplicateFeature { class: String, feature: String },

    #[error("Unknown super type {super_type} of class {class}")]
    UnknownSuperType { class: String, super_type: String },

    #[error("Inheritance cycle detected involving class: {0}")]
    InheritanceCycle(String),

    #[error("Unknown type {type_name} for feature {class}.{feature}")]
    UnknownFeatureType {
        class: String,
        feature: String,
        type_name: String,
    },

    #[error("Feature {class}.{feature} must target a class")]
    TargetNotClass { class: String, feature: String },

    #[error("Attribute {class}.{feature} must have a primitive type")]
    AttributeNotPrimitive { class: String, feature: String },

    #[error("Invalid limits for feature {class}.{feature}: upper limit below lower limit")]
    InvalidLimits { class: String, feature: String },

    #[error("Invalid upper limit {limit} for feature {class}.{feature}: expected -1 or a count")]
    InvalidUpperLimit {
        class: String,
        feature: String,
        limit: i64,
    },

    #[error("Invalid metamodel description: {0}")]
    Json(#[from] serde_json::Error),
}

/// Declaration of a feature, before its type name is resolved.
#[derive(Debug, Clone)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
    pub type_name: String,
    pub lower_limit: usize,
    pub upper_limit: Option<usize>,
    pub documentation: Option<String>,
}

impl FeatureSpec {
    /// Declare a feature; limits default to `[0, 1]`.
    pub fn new(name: impl Into<String>, kind: FeatureKind, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: type_name.into(),
            lower_limit: 0,
            upper_limit: Some(1),
            documentation: None,
        }
    }

    pub fn attribute(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FeatureKind::Attribute, type_name)
    }

    pub fn reference(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FeatureKind::Reference, type_name)
    }

    pub fn containment(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FeatureKind::Containment, type_name)
    }

    /// Lower limit 1.
    pub fn required(mut self) -> Self {
        self.lower_limit = 1;
        self
    }

    /// Unbounded upper limit.
    pub fn many(mut self) -> Self {
        self.upper_limit = None;
        self
    }

    pub fn with_limits(mut self, lower: usize, upper: Option<usize>) -> Self {
        self.lower_limit = lower;
        self.upper_limit = upper;
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

/// A class whose super-types and features are still unresolved.
#[derive(Debug)]
struct PendingClass {
    id: ClassId,
    name: String,
    is_abstract: bool,
    documentation: Option<String>,
    super_names: Vec<String>,
    features: Vec<FeatureSpec>,
}

/// Builder for constructing an immutable Metamodel.
#[derive(Debug)]
pub struct MetamodelBuilder {
    /// Classes in declaration order.
    classes: Vec<PendingClass>,
    /// Class name to handle mapping.
    class_names: HashMap<String, ClassId>,
    /// Primitive types by name.
    datatypes: HashMap<String, DataType>,
}

impl Default for MetamodelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetamodelBuilder {
    /// Create a new builder with the predefined primitive types.
    pub fn new() -> Self {
        let datatypes = [DataType::Text, DataType::Integer, DataType::Float, DataType::Boolean]
            .into_iter()
            .map(|data_type| (data_type.name().to_string(), data_type))
            .collect();
        Self {
            classes: Vec::new(),
            class_names: HashMap::new(),
            datatypes,
        }
    }

    /// Add a class definition.
    pub fn add_class(&mut self, name: impl Into<String>) -> ClassBuilder<'_> {
        ClassBuilder {
            builder: self,
            name: name.into(),
            is_abstract: false,
            documentation: None,
            super_names: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Add a free-text datatype under another name.
    ///
    /// Redeclaring a predefined primitive is a no-op.
    pub fn add_datatype(&mut self, name: impl Into<String>) -> Result<(), MetamodelError> {
        let name = name.into();
        if self.datatypes.get(&name).is_some_and(|existing| existing.name() == name) {
            return Ok(());
        }
        self.insert_datatype(name, DataType::Text)
    }

    /// Add an enumeration datatype.
    pub fn add_enum(
        &mut self,
        name: impl Into<String>,
        literals: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), MetamodelError> {
        let name = name.into();
        let literals = literals.into_iter().map(Into::into).collect();
        let data_type = DataType::Enum {
            name: name.clone(),
            literals,
        };
        self.insert_datatype(name, data_type)
    }

    fn insert_datatype(&mut self, name: String, data_type: DataType) -> Result<(), MetamodelError> {
        if self.datatypes.contains_key(&name) || self.class_names.contains_key(&name) {
            return Err(MetamodelError::DuplicateDatatypeName(name));
        }
        self.datatypes.insert(name, data_type);
        Ok(())
    }

    /// Build the immutable Metamodel.
    pub fn build(self) -> Result<Metamodel, MetamodelError> {
        let mut classes = Vec::with_capacity(self.classes.len());
        let mut features = Vec::new();

        // Resolve super-types and feature types
        for pending in &self.classes {
            let mut super_ids = Vec::with_capacity(pending.super_names.len());
            for super_name in &pending.super_names {
                let super_id = self.class_names.get(super_name).copied().ok_or_else(|| {
                    MetamodelError::UnknownSuperType {
                        class: pending.name.clone(),
                        super_type: super_name.clone(),
                    }
                })?;
                super_ids.push(super_id);
            }

            let mut own_features = Vec::with_capacity(pending.features.len());
            let mut seen = HashSet::new();
            for spec in &pending.features {
                if !seen.insert(spec.name.as_str()) {
                    return Err(MetamodelError::DuplicateFeature {
                        class: pending.name.clone(),
                        feature: spec.name.clone(),
                    });
                }
                let id = FeatureId::new(features.len() as u32);
                features.push(self.resolve_feature(pending, spec, id)?);
                own_features.push(id);
            }

            classes.push(ClassDef {
                id: pending.id,
                name: pending.name.clone(),
                is_abstract: pending.is_abstract,
                documentation: pending.documentation.clone(),
                super_ids,
                features: own_features,
            });
        }

        check_acyclic(&classes)?;

        let all_features = classes
            .iter()
            .map(|class| collect_features(&classes, &features, class.id))
            .collect();
        let subtype_index = SubtypeIndex::build(&classes);

        tracing::debug!(
            classes = classes.len(),
            features = features.len(),
            "metamodel built"
        );

        Ok(Metamodel::new(
            classes,
            self.class_names,
            features,
            all_features,
            subtype_index,
        ))
    }

    fn resolve_feature(
        &self,
        owner: &PendingClass,
        spec: &FeatureSpec,
        id: FeatureId,
    ) -> Result<FeatureDef, MetamodelError> {
        if spec.upper_limit.is_some_and(|upper| upper < spec.lower_limit) {
            return Err(MetamodelError::InvalidLimits {
                class: owner.name.clone(),
                feature: spec.name.clone(),
            });
        }

        let feature_type = if let Some(class_id) = self.class_names.get(&spec.type_name) {
            FeatureType::Class(*class_id)
        } else if let Some(data_type) = self.datatypes.get(&spec.type_name) {
            FeatureType::Data(data_type.clone())
        } else {
            return Err(MetamodelError::UnknownFeatureType {
                class: owner.name.clone(),
                feature: spec.name.clone(),
                type_name: spec.type_name.clone(),
            });
        };

        match (spec.kind, &feature_type) {
            (FeatureKind::Attribute, FeatureType::Class(_)) => {
                return Err(MetamodelError::AttributeNotPrimitive {
                    class: owner.name.clone(),
                    feature: spec.name.clone(),
                });
            }
            (FeatureKind::Reference | FeatureKind::Containment, FeatureType::Data(_)) => {
                return Err(MetamodelError::TargetNotClass {
                    class: owner.name.clone(),
                    feature: spec.name.clone(),
                });
            }
            _ => {}
        }

        Ok(FeatureDef {
            id,
            owner: owner.id,
            name: spec.name.clone(),
            kind: spec.kind,
            feature_type,
            lower_limit: spec.lower_limit,
            upper_limit: spec.upper_limit,
            documentation: spec.documentation.clone(),
        })
    }
}

/// Reject inheritance cycles with a depth-first walk over super-types.
fn check_acyclic(classes: &[ClassDef]) -> Result<(), MetamodelError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(classes: &[ClassDef], marks: &mut [Mark], id: ClassId) -> Result<(), MetamodelError> {
        match marks[id.index()] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(MetamodelError::InheritanceCycle(
                    classes[id.index()].name.clone(),
                ));
            }
            Mark::Unvisited => {}
        }
        marks[id.index()] = Mark::InProgress;
        for super_id in &classes[id.index()].super_ids {
            visit(classes, marks, *super_id)?;
        }
        marks[id.index()] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; classes.len()];
    for class in classes {
        visit(classes, &mut marks, class.id)?;
    }
    Ok(())
}

/// Collect features of a class and its parents, parents first, first name wins.
fn collect_features(classes: &[ClassDef], features: &[FeatureDef], class: ClassId) -> Vec<FeatureId> {
    fn walk(
        classes: &[ClassDef],
        features: &[FeatureDef],
        class: ClassId,
        result: &mut Vec<FeatureId>,
        seen: &mut HashSet<String>,
    ) {
        let def = &classes[class.index()];
        for super_id in &def.super_ids {
            walk(classes, features, *super_id, result, seen);
        }
        for feature_id in &def.features {
            let name = &features[feature_id.index()].name;
            if seen.insert(name.clone()) {
                result.push(*feature_id);
            }
        }
    }

    let mut result = Vec::new();
    let mut seen = HashSet::new();
    walk(classes, features, class, &mut result, &mut seen);
    result
}

/// Builder for a class definition.
pub struct ClassBuilder<'a> {
    builder: &'a mut MetamodelBuilder,
    name: String,
    is_abstract: bool,
    documentation: Option<String>,
    super_names: Vec<String>,
    features: Vec<FeatureSpec>,
}

impl<'a> ClassBuilder<'a> {
    /// Add a super-type by name.
    pub fn extends(mut self, super_name: impl Into<String>) -> Self {
        self.super_names.push(super_name.into());
        self
    }

    /// Mark as abstract.
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Add a feature.
    pub fn feature(mut self, spec: FeatureSpec) -> Self {
        self.features.push(spec);
        self
    }

    /// Finish building this class.
    pub fn done(self) -> Result<ClassId, MetamodelError> {
        if self.builder.class_names.contains_key(&self.name)
            || self.builder.datatypes.contains_key(&self.name)
        {
            return Err(MetamodelError::DuplicateClassName(self.name));
        }

        let id = ClassId::new(self.builder.classes.len() as u32);
        self.builder.class_names.insert(self.name.clone(), id);
        self.builder.classes.push(PendingClass {
            id,
            name: self.name,
            is_abstract: self.is_abstract,
            documentation: self.documentation,
            super_names: self.super_names,
            features: self.features,
        });

        Ok(id)
    }
}
