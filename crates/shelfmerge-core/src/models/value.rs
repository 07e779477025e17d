use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::OrderedSet;

/// Value of a catalog field whose name and shape are not known in advance.
///
/// A field holds either a single JSON value or a duplicate-free, ordered
/// collection of them. `Scalar` never wraps a JSON array or `null`; use
/// [`FieldValue::from_json`] to build one from raw input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Collection(OrderedSet<Value>),
    Scalar(Value),
}

impl FieldValue {
    /// Convert raw JSON. `null` means "no value" and yields `None`;
    /// arrays become collections with repeated elements collapsed.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(Self::Collection(
                items.into_iter().filter(|item| !item.is_null()).collect(),
            )),
            other => Some(Self::Scalar(other)),
        }
    }

    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn collection<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Collection(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_null_is_absent() {
        assert!(FieldValue::from_json(Value::Null).is_none());
    }

    #[test]
    fn test_from_json_array_becomes_deduplicated_collection() {
        let value = FieldValue::from_json(json!(["fiction", "fantasy", "fiction", null])).unwrap();
        assert_eq!(value, FieldValue::collection(["fiction", "fantasy"]));
    }

    #[test]
    fn test_from_json_object_stays_scalar() {
        let value = FieldValue::from_json(json!({"avg": 4.2})).unwrap();
        assert_eq!(value, FieldValue::Scalar(json!({"avg": 4.2})));
    }

    #[test]
    fn test_untagged_serialization() {
        assert_eq!(serde_json::to_value(FieldValue::scalar("P1")).unwrap(), json!("P1"));
        assert_eq!(
            serde_json::to_value(FieldValue::collection(["P1", "P2"])).unwrap(),
            json!(["P1", "P2"])
        );
    }
}
