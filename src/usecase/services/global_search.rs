use crate::domain::entities::query::SearchResult;
use crate::domain::entities::record::{Record, Value};
use crate::domain::schema::columns::DISCRIMINATOR_KEY;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedResults {
    pub records: Vec<Record>,
    pub total_count: u64,
}

/// Merges per-collection samples into one table. Every row gets the
/// `_collection` discriminator as its first key, overriding any field of
/// the same name the document carried.
pub fn flatten(results: &[SearchResult]) -> FlattenedResults {
    let mut flattened = FlattenedResults::default();

    for result in results {
        for sample in &result.samples {
            let mut record = Record::with_capacity(sample.len() + 1);
            record.insert(
                DISCRIMINATOR_KEY.to_string(),
                Value::Text(result.collection.clone()),
            );
            for (key, value) in sample {
                if key != DISCRIMINATOR_KEY {
                    record.insert(key.clone(), value.clone());
                }
            }
            flattened.records.push(record);
        }

        // Backends that omit `count` get the sample length instead.
        flattened.total_count += result.count.unwrap_or(result.samples.len() as u64);
    }

    flattened
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(collection: &str, count: Option<u64>, samples: &str) -> SearchResult {
        SearchResult {
            collection: collection.to_string(),
            count,
            samples: serde_json::from_str(samples).expect("fixture samples should decode"),
        }
    }

    #[test]
    fn tags_rows_and_sums_declared_counts() {
        let results = vec![
            result("users", Some(2), r#"[{"id":1}]"#),
            result("repos", Some(1), r#"[{"id":9}]"#),
        ];

        let flattened = flatten(&results);

        assert_eq!(flattened.records.len(), 2);
        assert_eq!(flattened.total_count, 3);
        assert_eq!(flattened.records[0][DISCRIMINATOR_KEY], Value::from("users"));
        assert_eq!(flattened.records[1][DISCRIMINATOR_KEY], Value::from("repos"));
        assert_eq!(
            flattened.records[0].keys().next().map(String::as_str),
            Some(DISCRIMINATOR_KEY)
        );
    }

    #[test]
    fn missing_count_falls_back_to_sample_length() {
        let results = vec![result("issues", None, r#"[{"n":1},{"n":2},{"n":3}]"#)];

        let flattened = flatten(&results);

        assert_eq!(flattened.total_count, 3);
    }

    #[test]
    fn discriminator_overrides_document_field() {
        let results = vec![result("commits", Some(1), r#"[{"_collection":"spoofed","sha":"abc"}]"#)];

        let flattened = flatten(&results);

        assert_eq!(flattened.records[0][DISCRIMINATOR_KEY], Value::from("commits"));
        assert_eq!(flattened.records[0].len(), 2);
    }

    #[test]
    fn empty_results_flatten_to_nothing() {
        let flattened = flatten(&[]);

        assert!(flattened.records.is_empty());
        assert_eq!(flattened.total_count, 0);
    }
}
