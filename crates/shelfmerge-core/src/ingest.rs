use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::IngestConfig;
use crate::error::{Result, ShelfError};
use crate::models::{FieldValue, NormalizedRecord};

/// Export-tool key names and the canonical names they map to.
const DEFAULT_FIELD_MAP: &[(&str, &str)] = &[
    ("Title", "title"),
    ("Author", "author"),
    ("Resource Type", "resourceType"),
    ("Publishers", "publisher"),
    ("Publication Date", "date"),
    ("My Tags", "myTags"),
    ("Community Tags", "communityTags"),
    ("Community Rating", "communityRating"),
    ("Subjects", "subjects"),
];

/// Key rename table applied to every raw record. Unknown keys pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    renames: BTreeMap<String, String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            renames: DEFAULT_FIELD_MAP
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl FieldMap {
    /// Built-in table extended (and overridden) by `extra`.
    pub fn with_overrides(extra: &BTreeMap<String, String>) -> Self {
        let mut map = Self::default();
        for (from, to) in extra {
            map.renames.insert(from.clone(), to.clone());
        }
        map
    }

    pub fn rename<'a>(&'a self, key: &'a str) -> &'a str {
        self.renames.get(key).map(String::as_str).unwrap_or(key)
    }
}

/// Load every catalog file in `dir` as normalized records.
///
/// Files are read in name order. A file that cannot be read or parsed is
/// skipped with a warning; a missing directory yields no records.
pub fn load_directory(dir: &Path, config: &IngestConfig) -> Result<Vec<NormalizedRecord>> {
    if !dir.exists() {
        warn!("Catalog directory not found: {}", dir.display());
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(ShelfError::DirectoryNotFound(dir.display().to_string()));
    }

    let field_map = FieldMap::with_overrides(&config.field_map);

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_catalog_extension(&path, &config.extensions) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        match load_file(&path, &field_map) {
            Ok(loaded) => {
                debug!("Loaded {} records from {}", loaded.len(), path.display());
                records.extend(loaded);
            }
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
            }
        }
    }

    Ok(records)
}

/// Parse one catalog file. The file name becomes each record's source.
pub fn load_file(path: &Path, field_map: &FieldMap) -> Result<Vec<NormalizedRecord>> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let contents = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&contents)?;
    parse_document(document, &source, field_map)
}

/// A document is either one record object or an array of them.
pub fn parse_document(
    document: Value,
    source: &str,
    field_map: &FieldMap,
) -> Result<Vec<NormalizedRecord>> {
    match document {
        Value::Object(map) => Ok(vec![normalize_object(map, source, field_map)]),
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for (idx, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(map) => records.push(normalize_object(map, source, field_map)),
                    other => debug!("{source}: skipping non-object item {idx}: {other}"),
                }
            }
            Ok(records)
        }
        other => Err(ShelfError::InvalidRecord {
            source_name: source.to_string(),
            reason: format!("expected an object or array, found {}", json_kind(&other)),
        }),
    }
}

/// Rename keys, coerce `author` into a list and tag the record with `source`.
pub fn normalize_object(
    raw: Map<String, Value>,
    source: &str,
    field_map: &FieldMap,
) -> NormalizedRecord {
    let mut record = NormalizedRecord {
        source: source.to_string(),
        ..Default::default()
    };

    for (key, value) in raw {
        match field_map.rename(&key) {
            "title" => record.title = scalar_text(&value),
            "author" => record.author = coerce_authors(value),
            "date" => record.date = scalar_text(&value),
            canonical => {
                let canonical = canonical.to_string();
                if let Some(field) = FieldValue::from_json(value)
                    && !record.set_field(canonical.as_str(), field)
                {
                    debug!("{source}: ignoring reserved key {key:?}");
                }
            }
        }
    }

    record
}

fn coerce_authors(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(&other).into_iter().collect(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn has_catalog_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
