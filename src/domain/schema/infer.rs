use indexmap::IndexMap;

use crate::domain::entities::query::{FieldDefinition, FieldType};
use crate::domain::entities::record::{Record, Value, VERSION_KEY};

/// Semantic type of a single sample. Total: every value maps to a type, and
/// anything without a better answer is treated as text.
pub fn infer_type(value: &Value) -> FieldType {
    match value {
        Value::Null => FieldType::String,
        Value::Bool(_) => FieldType::Boolean,
        Value::Number(_) => FieldType::Number,
        Value::Date(_) => FieldType::Date,
        Value::List(_) => FieldType::Array,
        Value::Record(_) => FieldType::Object,
        Value::Text(_) => FieldType::String,
    }
}

/// Field set for records with no declared schema.
///
/// Keys are the union over all records in first-seen order, minus the
/// versioning key and anything in `skip`. Each key is typed from the first
/// record that carries it, even when that value is `null`.
pub fn infer_fields(records: &[Record], skip: &[&str]) -> Vec<FieldDefinition> {
    let mut samples: IndexMap<&str, &Value> = IndexMap::new();

    for record in records {
        for (key, value) in record {
            if key == VERSION_KEY || skip.contains(&key.as_str()) {
                continue;
            }
            samples.entry(key.as_str()).or_insert(value);
        }
    }

    samples
        .into_iter()
        .map(|(key, sample)| FieldDefinition::new(key, infer_type(sample)))
        .collect()
}
