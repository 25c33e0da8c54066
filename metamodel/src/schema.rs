//! JSON description of a metamodel.
//!
//! ```json
//! [
//!   {"_class": "Enum", "name": "Visibility", "literals": ["public", "private"]},
//!   {"_class": "Class", "name": "Class", "superTypes": ["Named"], "features": [
//!     {"name": "name", "kind": "attribute", "type": "String", "lowerLimit": 1, "upperLimit": 1}
//!   ]}
//! ]
//! ```

use crate::{FeatureKind, FeatureSpec, Metamodel, MetamodelBuilder, MetamodelError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "_class")]
enum SchemaEntry {
    Datatype {
        name: String,
    },
    Enum {
        name: String,
        #[serde(default)]
        literals: Vec<String>,
    },
    Class(ClassSchema),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassSchema {
    name: String,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    #[serde(default)]
    super_types: Vec<String>,
    #[serde(default)]
    features: Vec<FeatureSchema>,
    #[serde(default)]
    documentation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureSchema {
    name: String,
    kind: FeatureKind,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    lower_limit: usize,
    /// `-1` means unbounded.
    #[serde(default = "default_upper_limit")]
    upper_limit: i64,
    #[serde(default)]
    documentation: Option<String>,
}

fn default_upper_limit() -> i64 {
    1
}

impl FeatureSchema {
    fn into_spec(self, class: &str) -> Result<FeatureSpec, MetamodelError> {
        let upper = match self.upper_limit {
            -1 => None,
            limit => Some(usize::try_from(limit).map_err(|_| MetamodelError::InvalidUpperLimit {
                class: class.to_string(),
                feature: self.name.clone(),
                limit,
            })?),
        };
        let spec = FeatureSpec::new(self.name, self.kind, self.type_name)
            .with_limits(self.lower_limit, upper);
        Ok(match self.documentation {
            Some(documentation) => spec.with_documentation(documentation),
            None => spec,
        })
    }
}

/// Build a metamodel from its JSON description.
pub(crate) fn load(text: &str) -> Result<Metamodel, MetamodelError> {
    let entries: Vec<SchemaEntry> = serde_json::from_str(text)?;
    let mut builder = MetamodelBuilder::new();

    for entry in entries {
        match entry {
            SchemaEntry::Datatype { name } => builder.add_datatype(name)?,
            SchemaEntry::Enum { name, literals } => builder.add_enum(name, literals)?,
            SchemaEntry::Class(class) => {
                let features = class
                    .features
                    .into_iter()
                    .map(|feature| feature.into_spec(&class.name))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut class_builder = builder.add_class(class.name);
                if class.is_abstract {
                    class_builder = class_builder.abstract_class();
                }
                if let Some(documentation) = class.documentation {
                    class_builder = class_builder.documentation(documentation);
                }
                for super_type in class.super_types {
                    class_builder = class_builder.extends(super_type);
                }
                for feature in features {
                    class_builder = class_builder.feature(feature);
                }
                class_builder.done()?;
            }
        }
    }

    builder.build()
}
