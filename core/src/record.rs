//! The record format: the serialization boundary for extract/create/paste.
//!
//! A record is `{ "_class": <class-name>, <feature-name>: <item> | [<item>, ...] }`
//! where an item is either a string (attribute literal or reference text) or
//! a nested record (containment child).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ModelResult;

/// One element serialized as a tree of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Class name of the element.
    #[serde(rename = "_class")]
    pub class: String,
    /// Feature values in declaration order.
    #[serde(flatten)]
    pub features: IndexMap<String, FeatureData>,
}

/// The value(s) recorded for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureData {
    Many(Vec<RecordItem>),
    One(RecordItem),
}

/// A single recorded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordItem {
    /// Attribute literal or reference identifier.
    Text(String),
    /// Containment child.
    Record(Record),
}

/// Either a single record or an ordered list of them (bulk/paste input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordBatch {
    Many(Vec<Record>),
    One(Record),
}

impl Record {
    /// Create an empty record of the given class.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            features: IndexMap::new(),
        }
    }

    /// Append a text value to a feature.
    pub fn with_text(self, feature: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_item(feature, RecordItem::Text(text.into()))
    }

    /// Append a containment child to a feature.
    pub fn with_child(self, feature: impl Into<String>, child: Record) -> Self {
        self.with_item(feature, RecordItem::Record(child))
    }

    /// Append an item to a feature, upgrading a single item to a list.
    pub fn with_item(mut self, feature: impl Into<String>, item: RecordItem) -> Self {
        self.push_item(feature, item);
        self
    }

    /// Append an item to a feature in place.
    pub fn push_item(&mut self, feature: impl Into<String>, item: RecordItem) {
        match self.features.entry(feature.into()) {
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(FeatureData::One(item));
            }
            indexmap::map::Entry::Occupied(mut entry) => {
                let data = entry.get_mut();
                let items = match std::mem::replace(data, FeatureData::Many(Vec::new())) {
                    FeatureData::Many(mut items) => {
                        items.push(item);
                        items
                    }
                    FeatureData::One(first) => vec![first, item],
                };
                *data = FeatureData::Many(items);
            }
        }
    }

    /// Get the items recorded for a feature.
    pub fn items(&self, feature: &str) -> &[RecordItem] {
        self.features
            .get(feature)
            .map(FeatureData::items)
            .unwrap_or_default()
    }

    /// Parse a single record or a list of records from JSON text.
    pub fn parse_batch(text: &str) -> ModelResult<Vec<Record>> {
        let batch: RecordBatch = serde_json::from_str(text)?;
        Ok(batch.into_vec())
    }

    /// Serialize a list of records as pretty-printed JSON.
    pub fn to_json(records: &[Record]) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }
}

impl FeatureData {
    /// View the recorded items as a slice regardless of arity.
    pub fn items(&self) -> &[RecordItem] {
        match self {
            FeatureData::Many(items) => items,
            FeatureData::One(item) => std::slice::from_ref(item),
        }
    }

    /// Collapse a list of items into the record shape: one item stays single.
    pub fn from_items(mut items: Vec<RecordItem>) -> Option<Self> {
        match items.len() {
            0 => None,
            1 => items.pop().map(FeatureData::One),
            _ => Some(FeatureData::Many(items)),
        }
    }
}

impl RecordItem {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordItem::Text(text) => Some(text),
            RecordItem::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            RecordItem::Record(record) => Some(record),
            RecordItem::Text(_) => None,
        }
    }
}

impl RecordBatch {
    pub fn into_vec(self) -> Vec<Record> {
        match self {
            RecordBatch::Many(records) => records,
            RecordBatch::One(record) => vec![record],
        }
    }
}

impl From<Record> for RecordBatch {
    fn from(record: Record) -> Self {
        RecordBatch::One(record)
    }
}

impl From<Vec<Record>> for RecordBatch {
    fn from(records: Vec<Record>) -> Self {
        RecordBatch::Many(records)
    }
}
