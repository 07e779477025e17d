use std::collections::BTreeMap;

use serde::Serialize;

use super::FieldValue;

/// Field names with dedicated slots on [`NormalizedRecord`] and
/// [`super::MergedRecord`]. They never appear in the generic field map.
pub const RESERVED_FIELDS: &[&str] = &["title", "author", "date", "dates", "source", "sources"];

pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// A single catalog entry after key renaming and author coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub author: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Provenance: the file or feed this record came from.
    pub source: String,

    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl NormalizedRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// A record with no title at all. Never becomes a catalog entry.
    pub fn untitled() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author.push(author.into());
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.author.extend(authors.into_iter().map(Into::into));
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.set_field(key, value);
        self
    }

    /// Store an extra field. Reserved names are rejected and `false` is returned.
    pub fn set_field(&mut self, key: impl Into<String>, value: FieldValue) -> bool {
        let key = key.into();
        if is_reserved_field(&key) {
            return false;
        }
        self.fields.insert(key, value);
        true
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// The title, if it contains anything besides whitespace.
    pub fn usable_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}
