//! Column descriptors derived from declared or inferred field definitions.
//!
//! Descriptors are always rebuilt as a whole set. Nothing here patches an
//! existing column list, so a formatter can never outlive the field type it
//! was chosen for.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::domain::entities::query::{FieldDefinition, FieldType};
use crate::domain::entities::record::{Record, Value};
use crate::domain::schema::infer::infer_fields;

/// Synthetic column naming the collection a flattened search row came from.
pub const DISCRIMINATOR_KEY: &str = "_collection";
const DISCRIMINATOR_HEADER: &str = "Collection";
const DISCRIMINATOR_WIDTH: u32 = 150;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    NumberRange,
    DateRange,
}

impl FilterKind {
    pub fn widget_name(&self) -> &'static str {
        match self {
            FilterKind::Text => "agTextColumnFilter",
            FilterKind::NumberRange => "agNumberColumnFilter",
            FilterKind::DateRange => "agDateColumnFilter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Contains,
    NotContains,
    Equals,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "notContains",
            FilterOperator::Equals => "equals",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "contains" => Some(FilterOperator::Contains),
            "notContains" => Some(FilterOperator::NotContains),
            "equals" => Some(FilterOperator::Equals),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "Contains",
            FilterOperator::NotContains => "Does not contain",
            FilterOperator::Equals => "Equals",
        }
    }
}

const BOOLEAN_OPERATORS: [FilterOperator; 3] = [
    FilterOperator::Contains,
    FilterOperator::NotContains,
    FilterOperator::Equals,
];

/// Booleans get a text filter on purpose: backends store them as assorted
/// literals, and a toggle cannot express contains/not-contains.
pub fn filter_kind_for(field_type: FieldType) -> FilterKind {
    match field_type {
        FieldType::Number => FilterKind::NumberRange,
        FieldType::Date => FilterKind::DateRange,
        FieldType::Boolean | FieldType::Object | FieldType::Array | FieldType::String => {
            FilterKind::Text
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Raw,
    Timestamp,
    Json,
    YesNo,
}

impl ValueFormat {
    pub fn for_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Date => ValueFormat::Timestamp,
            FieldType::Object | FieldType::Array => ValueFormat::Json,
            FieldType::Boolean => ValueFormat::YesNo,
            FieldType::String | FieldType::Number => ValueFormat::Raw,
        }
    }

    pub fn format(&self, value: &Value) -> String {
        self.format_in(value, &Local)
    }

    fn format_in<Tz>(&self, value: &Value, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match self {
            ValueFormat::Raw => value.to_cell_text(),
            ValueFormat::Timestamp => {
                if !value.is_truthy() {
                    return String::new();
                }
                render_timestamp(value, tz).unwrap_or_else(|| value.to_cell_text())
            }
            ValueFormat::Json => {
                if value.is_truthy() {
                    value.to_json_string()
                } else {
                    String::new()
                }
            }
            ValueFormat::YesNo => {
                if value.is_truthy() {
                    "Yes".to_string()
                } else {
                    "No".to_string()
                }
            }
        }
    }
}

fn render_timestamp<Tz>(value: &Value, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let instant: DateTime<Utc> = match value {
        Value::Date(date) => date.with_timezone(&Utc),
        Value::Number(millis) => Utc.timestamp_millis_opt(*millis as i64).single()?,
        Value::Text(text) => parse_timestamp(text)?,
        _ => return None,
    };
    Some(instant.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string())
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub field: String,
    pub header: String,
    pub field_type: FieldType,
    pub filter: FilterKind,
    /// Empty means the widget's default operator list.
    pub filter_operators: Vec<FilterOperator>,
    pub suppress_and_or: bool,
    pub format: ValueFormat,
    /// Stays visible at the left edge while scrolling sideways.
    pub pinned_left: bool,
    pub width: Option<u32>,
    pub sortable: bool,
}

impl ColumnDescriptor {
    pub fn for_field(definition: &FieldDefinition) -> Self {
        let field_type = definition.field_type;
        let (filter_operators, suppress_and_or) = if field_type == FieldType::Boolean {
            (BOOLEAN_OPERATORS.to_vec(), true)
        } else {
            (Vec::new(), false)
        };

        Self {
            field: definition.field.clone(),
            header: format_header_name(&definition.field),
            field_type,
            filter: filter_kind_for(field_type),
            filter_operators,
            suppress_and_or,
            format: ValueFormat::for_type(field_type),
            pinned_left: false,
            width: None,
            sortable: true,
        }
    }

    pub fn discriminator() -> Self {
        Self {
            field: DISCRIMINATOR_KEY.to_string(),
            header: DISCRIMINATOR_HEADER.to_string(),
            field_type: FieldType::String,
            filter: FilterKind::Text,
            filter_operators: Vec::new(),
            suppress_and_or: false,
            format: ValueFormat::Raw,
            pinned_left: true,
            width: Some(DISCRIMINATOR_WIDTH),
            sortable: true,
        }
    }

    pub fn is_discriminator(&self) -> bool {
        self.field == DISCRIMINATOR_KEY
    }

    pub fn value<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        lookup_path(record, &self.field)
    }

    /// Display text for this column's cell in `record`.
    pub fn cell_text(&self, record: &Record) -> String {
        self.format.format(self.value(record).unwrap_or(&Value::Null))
    }
}

/// Exact key first, then the dotted path through nested records.
pub fn lookup_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        match current {
            Value::Record(nested) => current = nested.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// `created_at.iso` becomes `Created At Iso`.
pub fn format_header_name(field: &str) -> String {
    field
        .split(['.', '_'])
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn build_columns(fields: &[FieldDefinition]) -> Vec<ColumnDescriptor> {
    fields.iter().map(ColumnDescriptor::for_field).collect()
}

/// Columns for rows that came without a declared schema.
pub fn build_columns_from_records(records: &[Record]) -> Vec<ColumnDescriptor> {
    build_columns(&infer_fields(records, &[]))
}

/// Columns for flattened cross-collection rows: discriminator first, then
/// the union of every other key. No rows, no columns.
pub fn build_columns_from_samples(records: &[Record]) -> Vec<ColumnDescriptor> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut columns = vec![ColumnDescriptor::discriminator()];
    columns.extend(build_columns(&infer_fields(records, &[DISCRIMINATOR_KEY])));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).expect("fixture record should decode")
    }

    #[test]
    fn header_names_split_on_dots_and_underscores() {
        assert_eq!(format_header_name("created_at.iso"), "Created At Iso");
        assert_eq!(format_header_name("name"), "Name");
        assert_eq!(format_header_name("_id"), " Id");
        assert_eq!(format_header_name("pullRequests"), "PullRequests");
    }

    #[test]
    fn filter_kinds_follow_field_type() {
        assert_eq!(filter_kind_for(FieldType::Number), FilterKind::NumberRange);
        assert_eq!(filter_kind_for(FieldType::Date), FilterKind::DateRange);
        assert_eq!(filter_kind_for(FieldType::Boolean), FilterKind::Text);
        assert_eq!(filter_kind_for(FieldType::Object), FilterKind::Text);
        assert_eq!(filter_kind_for(FieldType::Array), FilterKind::Text);
        assert_eq!(filter_kind_for(FieldType::String), FilterKind::Text);
    }

    #[test]
    fn boolean_columns_expose_text_operators() {
        let column = ColumnDescriptor::for_field(&FieldDefinition::new(
            "private",
            FieldType::Boolean,
        ));

        assert_eq!(column.filter, FilterKind::Text);
        assert_eq!(
            column
                .filter_operators
                .iter()
                .map(FilterOperator::as_str)
                .collect::<Vec<_>>(),
            vec!["contains", "notContains", "equals"]
        );
        assert!(column.suppress_and_or);
        assert_eq!(column.format, ValueFormat::YesNo);
    }

    #[test]
    fn value_formats_render_by_type() {
        assert_eq!(ValueFormat::YesNo.format(&Value::Bool(true)), "Yes");
        assert_eq!(ValueFormat::YesNo.format(&Value::Null), "No");
        assert_eq!(
            ValueFormat::Json.format(&Value::List(vec![Value::from(1_i64), Value::from("a")])),
            r#"[1,"a"]"#
        );
        assert_eq!(ValueFormat::Json.format(&Value::Null), "");
        assert_eq!(ValueFormat::Raw.format(&Value::from(7_i64)), "7");
        assert_eq!(ValueFormat::Timestamp.format(&Value::Null), "");
    }

    #[test]
    fn timestamps_render_in_requested_zone() {
        let rendered = ValueFormat::Timestamp
            .format_in(&Value::from("2024-05-01T10:30:00Z"), &Utc);
        assert_eq!(rendered, "2024-05-01 10:30:00");

        let from_millis = ValueFormat::Timestamp.format_in(&Value::Number(0.0), &Utc);
        assert_eq!(from_millis, "");

        let unparsable = ValueFormat::Timestamp.format_in(&Value::from("soon"), &Utc);
        assert_eq!(unparsable, "soon");
    }

    #[test]
    fn build_columns_is_idempotent() {
        let fields = vec![
            FieldDefinition::new("name", FieldType::String),
            FieldDefinition::new("stars", FieldType::Number),
            FieldDefinition::new("created_at", FieldType::Date),
            FieldDefinition::new("labels", FieldType::Array),
        ];

        assert_eq!(build_columns(&fields), build_columns(&fields));
        assert_eq!(build_columns(&fields).len(), 4);
    }

    #[test]
    fn sample_columns_pin_discriminator_first() {
        let records = vec![
            record(r#"{"_collection":"users","login":"octocat","__v":0}"#),
            record(r#"{"_collection":"repos","stars":5}"#),
        ];

        let columns = build_columns_from_samples(&records);

        let fields = columns.iter().map(|c| c.field.as_str()).collect::<Vec<_>>();
        assert_eq!(fields, vec!["_collection", "login", "stars"]);
        assert!(columns[0].pinned_left);
        assert_eq!(columns[0].header, "Collection");
        assert_eq!(columns[0].width, Some(150));
        assert_eq!(columns[2].filter, FilterKind::NumberRange);
    }

    #[test]
    fn empty_samples_yield_no_columns() {
        assert!(build_columns_from_samples(&[]).is_empty());
    }

    #[test]
    fn cell_text_follows_dotted_paths() {
        let row = record(r#"{"author":{"login":"octocat"},"created.at":"x"}"#);
        let nested = ColumnDescriptor::for_field(&FieldDefinition::new(
            "author.login",
            FieldType::String,
        ));
        let literal = ColumnDescriptor::for_field(&FieldDefinition::new(
            "created.at",
            FieldType::String,
        ));

        assert_eq!(nested.cell_text(&row), "octocat");
        assert_eq!(literal.cell_text(&row), "x");
    }
}
