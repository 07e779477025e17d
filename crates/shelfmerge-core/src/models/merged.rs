use std::collections::BTreeMap;

use serde::Serialize;

use super::{FieldValue, OrderedSet};

/// One deduplicated book: the union of every record folded into its cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    /// Title of the record that opened the cluster. Never overwritten.
    pub title: String,
    pub author: OrderedSet<String>,
    pub dates: OrderedSet<String>,
    pub sources: OrderedSet<String>,

    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl MergedRecord {
    /// An empty cluster for `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: OrderedSet::new(),
            dates: OrderedSet::new(),
            sources: OrderedSet::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}
