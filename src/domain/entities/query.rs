use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::entities::record::Record;
use crate::domain::entities::record::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }

    /// Unknown type names coming from the backend degrade to `String`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "object" => FieldType::Object,
            "array" => FieldType::Array,
            _ => FieldType::String,
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        FieldType::from_name(&value)
    }
}

impl Serialize for FieldType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(FieldType::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDefinition {
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            field_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    #[serde(rename = "type")]
    pub filter_type: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, FilterEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl QueryRequest {
    pub fn new(page: u32, page_size: u32) -> Result<Self, QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidRequest("page must be at least 1".to_string()));
        }
        if page_size == 0 {
            return Err(QueryError::InvalidRequest(
                "page_size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            page,
            page_size,
            sort_field: None,
            sort_order: None,
            filters: IndexMap::new(),
            search_term: None,
        })
    }

    /// Row offset of the first record this request asks for.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl QueryResponse {
    /// Page count derived from the totals rather than trusted from the wire.
    pub fn computed_total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    pub fn is_consistent(&self) -> bool {
        self.total_pages == self.computed_total_pages()
            && (self.page_size == 0 || self.data.len() <= self.page_size as usize)
    }
}

/// `ceil(total_count / page_size)`, zero when there is nothing to page.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 || total_count == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSearchRequest {
    pub search_term: String,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSearchResult")]
pub struct SearchResult {
    pub collection: String,
    pub count: Option<u64>,
    pub samples: Vec<Record>,
}

/// Older backends name the sample list `data`; it wins when both are sent.
#[derive(Deserialize)]
struct RawSearchResult {
    collection: String,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    samples: Option<Vec<Record>>,
    #[serde(default)]
    data: Option<Vec<Record>>,
}

impl From<RawSearchResult> for SearchResult {
    fn from(raw: RawSearchResult) -> Self {
        SearchResult {
            collection: raw.collection,
            count: raw.count,
            samples: raw.data.or(raw.samples).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionList {
    #[serde(default)]
    pub collections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("Error {code}: {message}")]
    Status { code: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up_and_is_zero_for_empty() {
        assert_eq!(total_pages(0, 100), 0);
        assert_eq!(total_pages(1, 100), 1);
        assert_eq!(total_pages(100, 100), 1);
        assert_eq!(total_pages(101, 100), 2);
        assert_eq!(total_pages(250, 25), 10);
    }

    #[test]
    fn request_rejects_zero_page_or_page_size() {
        assert!(matches!(
            QueryRequest::new(0, 10),
            Err(QueryError::InvalidRequest(_))
        ));
        assert!(matches!(
            QueryRequest::new(1, 0),
            Err(QueryError::InvalidRequest(_))
        ));
        let request = QueryRequest::new(3, 50).expect("request should be valid");
        assert_eq!(request.offset(), 100);
    }

    #[test]
    fn request_serializes_camel_case_and_skips_absent_parts() {
        let mut request = QueryRequest::new(2, 100).expect("request should be valid");
        request.sort_field = Some("created_at".to_string());
        request.sort_order = Some(SortDirection::Desc);

        let json = serde_json::to_value(&request).expect("request should serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "page": 2,
                "pageSize": 100,
                "sortField": "created_at",
                "sortOrder": "desc"
            })
        );
    }

    #[test]
    fn unknown_field_types_degrade_to_string() {
        let fields: Vec<FieldDefinition> = serde_json::from_str(
            r#"[{"field":"_id","type":"objectid"},{"field":"stars","type":"number"}]"#,
        )
        .expect("fields should decode");

        assert_eq!(fields[0].field_type, FieldType::String);
        assert_eq!(fields[1].field_type, FieldType::Number);
    }

    #[test]
    fn search_result_prefers_data_over_samples() {
        let result: SearchResult = serde_json::from_str(
            r#"{"collection":"users","data":[{"id":1}],"samples":[{"id":2},{"id":3}]}"#,
        )
        .expect("result should decode");

        assert_eq!(result.samples.len(), 1);
        assert_eq!(result.count, None);
    }

    #[test]
    fn response_consistency_checks_page_count() {
        let response: QueryResponse = serde_json::from_str(
            r#"{"data":[],"totalCount":201,"page":1,"pageSize":100,"totalPages":3,"fields":[]}"#,
        )
        .expect("response should decode");
        assert!(response.is_consistent());

        let drifted = QueryResponse {
            total_pages: 2,
            ..response
        };
        assert!(!drifted.is_consistent());
    }
}
