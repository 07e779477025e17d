use std::collections::btree_map::Entry;

use serde_json::Value;
use shelfmerge_core::models::is_reserved_field;
use shelfmerge_core::{FieldValue, MergedRecord, NormalizedRecord, OrderedSet};

/// Folding a matched record into its cluster.
pub trait MergeRecord {
    fn merge_record(&mut self, incoming: NormalizedRecord);
}

impl MergeRecord for MergedRecord {
    fn merge_record(&mut self, incoming: NormalizedRecord) {
        // Title is fixed by the record that opened the cluster.
        self.author.extend(incoming.author);

        if let Some(date) = incoming.date.filter(|d| !d.trim().is_empty()) {
            self.dates.insert(date);
        }

        if !incoming.source.is_empty() {
            self.sources.insert(incoming.source);
        }

        for (key, value) in incoming.fields {
            if is_reserved_field(&key) {
                continue;
            }
            match self.fields.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(mut slot) => merge_field_value(slot.get_mut(), value),
            }
        }
    }
}

/// Combine `incoming` into `existing` without losing or repeating values.
///
/// A collection absorbs the incoming value(s). A scalar stays a scalar while
/// every source agrees and becomes a collection of the distinct values, in
/// order of first appearance, on the first disagreement.
pub fn merge_field_value(existing: &mut FieldValue, incoming: FieldValue) {
    let upgraded: OrderedSet<Value> = match (&mut *existing, incoming) {
        (FieldValue::Collection(values), FieldValue::Collection(new_values)) => {
            values.extend(new_values);
            return;
        }
        (FieldValue::Collection(values), FieldValue::Scalar(value)) => {
            values.insert(value);
            return;
        }
        (FieldValue::Scalar(current), FieldValue::Scalar(value)) => {
            if *current == value {
                return;
            }
            [std::mem::take(current), value].into_iter().collect()
        }
        (FieldValue::Scalar(current), FieldValue::Collection(values)) => {
            std::iter::once(std::mem::take(current))
                .chain(values)
                .collect()
        }
    };
    *existing = FieldValue::Collection(upgraded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cluster(title: &str) -> MergedRecord {
        MergedRecord::new(title)
    }

    #[test]
    fn test_merge_into_empty_cluster_copies_everything() {
        let mut merged = cluster("Dune");
        merged.merge_record(
            NormalizedRecord::new("Dune")
                .with_authors(["Frank Herbert"])
                .with_date("1965")
                .with_source("a.json")
                .with_field("publisher", FieldValue::scalar("Chilton"))
                .with_field("myTags", FieldValue::collection(["scifi", "classic"])),
        );

        assert_eq!(merged.author.as_slice(), &["Frank Herbert".to_string()]);
        assert_eq!(merged.dates.as_slice(), &["1965".to_string()]);
        assert_eq!(merged.sources.as_slice(), &["a.json".to_string()]);
        assert_eq!(merged.field("publisher"), Some(&FieldValue::scalar("Chilton")));
        assert_eq!(
            merged.field("myTags"),
            Some(&FieldValue::collection(["scifi", "classic"]))
        );
    }

    #[test]
    fn test_title_is_never_overwritten() {
        let mut merged = cluster("Deep Work");
        merged.merge_record(NormalizedRecord::new("Deep Work: Rules for Focused Success"));
        assert_eq!(merged.title, "Deep Work");
    }

    #[test]
    fn test_blank_date_and_source_are_ignored() {
        let mut merged = cluster("X");
        merged.merge_record(NormalizedRecord::new("X").with_date("  "));
        assert!(merged.dates.is_empty());
        assert!(merged.sources.is_empty());
    }

    #[test]
    fn test_scalar_upgrades_on_divergence() {
        let mut value = FieldValue::scalar("P1");
        merge_field_value(&mut value, FieldValue::scalar("P1"));
        assert_eq!(value, FieldValue::scalar("P1"));

        merge_field_value(&mut value, FieldValue::scalar("P2"));
        assert_eq!(value, FieldValue::collection(["P1", "P2"]));

        merge_field_value(&mut value, FieldValue::scalar("P1"));
        merge_field_value(&mut value, FieldValue::scalar("P3"));
        assert_eq!(value, FieldValue::collection(["P1", "P2", "P3"]));
    }

    #[test]
    fn test_collection_unions_collection() {
        let mut value = FieldValue::collection(["history", "theology"]);
        merge_field_value(&mut value, FieldValue::collection(["theology", "church"]));
        assert_eq!(value, FieldValue::collection(["history", "theology", "church"]));
    }

    #[test]
    fn test_scalar_meets_collection() {
        let mut value = FieldValue::scalar(4.5);
        merge_field_value(&mut value, FieldValue::collection([json!(4.0), json!(4.5)]));
        assert_eq!(value, FieldValue::collection([json!(4.5), json!(4.0)]));
    }

    #[test]
    fn test_mixed_value_types_are_kept_apart() {
        let mut value = FieldValue::scalar("1973");
        merge_field_value(&mut value, FieldValue::scalar(1973));
        assert_eq!(value, FieldValue::collection([json!("1973"), json!(1973)]));
    }

    #[test]
    fn test_reserved_keys_in_fields_are_skipped() {
        let mut merged = cluster("X");
        let mut record = NormalizedRecord::new("X").with_source("a.json");
        record
            .fields
            .insert("sources".to_string(), FieldValue::scalar("forged.json"));
        merged.merge_record(record);
        assert!(merged.fields.is_empty());
        assert_eq!(merged.sources.as_slice(), &["a.json".to_string()]);
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let record = NormalizedRecord::new("X")
            .with_authors(["A", "B"])
            .with_date("2001")
            .with_source("a.json")
            .with_field("publisher", FieldValue::scalar("P1"))
            .with_field("subjects", FieldValue::collection(["s1", "s2"]));

        let mut merged = cluster("X");
        merged.merge_record(record.clone());
        let snapshot = merged.clone();
        merged.merge_record(record);
        assert_eq!(merged, snapshot);
    }
}
