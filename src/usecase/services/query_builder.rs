use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::entities::query::{FilterEntry, QueryError, QueryRequest, SortDirection};
use crate::domain::entities::record::Value;

/// Operator sent when the filter widget did not name one.
pub const DEFAULT_FILTER_TYPE: &str = "contains";

/// One column's entry in the grid's filter model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterModelEntry {
    #[serde(default)]
    pub filter_type: Option<String>,
    #[serde(default, rename = "type")]
    pub operator: Option<String>,
    #[serde(default)]
    pub filter: Option<Value>,
}

impl FilterModelEntry {
    pub fn contains(value: impl Into<Value>) -> Self {
        Self {
            filter_type: Some("text".to_string()),
            operator: None,
            filter: Some(value.into()),
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }
}

pub type FilterModel = IndexMap<String, FilterModelEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortModelEntry {
    pub col_id: String,
    pub sort: SortDirection,
}

impl SortModelEntry {
    pub fn new(col_id: impl Into<String>, sort: SortDirection) -> Self {
        Self {
            col_id: col_id.into(),
            sort,
        }
    }
}

/// Active sort columns in priority order.
pub type SortModel = Vec<SortModelEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewWindow {
    /// Virtual scrolling: a block of rows starting at `start_row`.
    Block { start_row: u64, block_size: u32 },
    /// Explicit page cursor, 1-based.
    Page { page: u32, page_size: u32 },
}

/// Snapshot of what the grid is showing, owned by one component.
#[derive(Debug, Clone, PartialEq)]
pub struct GridViewState {
    pub window: ViewWindow,
    pub sort: SortModel,
    pub filters: FilterModel,
    pub search_term: String,
}

impl GridViewState {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            window: ViewWindow::Page { page, page_size },
            sort: SortModel::new(),
            filters: FilterModel::new(),
            search_term: String::new(),
        }
    }

    pub fn block(start_row: u64, block_size: u32) -> Self {
        Self {
            window: ViewWindow::Block {
                start_row,
                block_size,
            },
            sort: SortModel::new(),
            filters: FilterModel::new(),
            search_term: String::new(),
        }
    }
}

/// Whole pages aligned to the grid's cache block, so the same window always
/// maps to the same page number.
pub fn page_for_block(start_row: u64, block_size: u32) -> u32 {
    let block_size = u64::from(block_size.max(1));
    u32::try_from(start_row / block_size + 1).unwrap_or(u32::MAX)
}

/// Entries with no value, a null value, or an empty string are dropped.
pub fn translate_filters(model: &FilterModel) -> IndexMap<String, FilterEntry> {
    model
        .iter()
        .filter_map(|(field, entry)| {
            let value = entry.filter.as_ref().filter(|value| !value.is_empty())?;
            let filter_type = entry
                .operator
                .as_deref()
                .filter(|operator| !operator.is_empty())
                .unwrap_or(DEFAULT_FILTER_TYPE)
                .to_string();
            Some((
                field.clone(),
                FilterEntry {
                    filter_type,
                    value: value.clone(),
                },
            ))
        })
        .collect()
}

/// Only the first sort column is forwarded. Secondary sort columns are
/// discarded; the backend accepts a single sort key.
pub fn primary_sort(model: &SortModel) -> Option<(String, SortDirection)> {
    model
        .first()
        .map(|entry| (entry.col_id.clone(), entry.sort))
}

/// Rejects a zero page or page size instead of guessing one.
pub fn build_request(view: &GridViewState) -> Result<QueryRequest, QueryError> {
    let (page, page_size) = match view.window {
        ViewWindow::Block {
            start_row,
            block_size,
        } => (page_for_block(start_row, block_size), block_size),
        ViewWindow::Page { page, page_size } => (page, page_size),
    };

    let mut request = QueryRequest::new(page, page_size)?;
    if let Some((field, direction)) = primary_sort(&view.sort) {
        request.sort_field = Some(field);
        request.sort_order = Some(direction);
    }
    request.filters = translate_filters(&view.filters);
    if !view.search_term.is_empty() {
        request.search_term = Some(view.search_term.clone());
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_map_to_whole_pages() {
        assert_eq!(page_for_block(0, 100), 1);
        assert_eq!(page_for_block(99, 100), 1);
        assert_eq!(page_for_block(100, 100), 2);
        assert_eq!(page_for_block(250, 100), 3);
        assert_eq!(page_for_block(7, 0), 8);
    }

    #[test]
    fn empty_filters_are_never_forwarded() {
        let mut model = FilterModel::new();
        model.insert("name".to_string(), FilterModelEntry::contains("oct"));
        model.insert("blank".to_string(), FilterModelEntry::contains(""));
        model.insert(
            "nulled".to_string(),
            FilterModelEntry {
                filter: Some(Value::Null),
                ..FilterModelEntry::default()
            },
        );
        model.insert("missing".to_string(), FilterModelEntry::default());
        model.insert("zero".to_string(), FilterModelEntry::contains(0_i64));

        let filters = translate_filters(&model);

        assert_eq!(filters.keys().collect::<Vec<_>>(), vec!["name", "zero"]);
        assert_eq!(filters["name"].filter_type, "contains");
        assert_eq!(filters["zero"].value, Value::Number(0.0));
    }

    #[test]
    fn explicit_operator_is_kept() {
        let mut model = FilterModel::new();
        model.insert(
            "stars".to_string(),
            FilterModelEntry::contains(10_i64).with_operator("greaterThan"),
        );

        let filters = translate_filters(&model);

        assert_eq!(filters["stars"].filter_type, "greaterThan");
    }

    #[test]
    fn only_primary_sort_is_forwarded() {
        let mut view = GridViewState::block(200, 100);
        view.sort = vec![
            SortModelEntry::new("stars", SortDirection::Desc),
            SortModelEntry::new("name", SortDirection::Asc),
        ];

        let request = build_request(&view).expect("block view should build");

        assert_eq!(request.page, 3);
        assert_eq!(request.page_size, 100);
        assert_eq!(request.sort_field.as_deref(), Some("stars"));
        assert_eq!(request.sort_order, Some(SortDirection::Desc));
    }

    #[test]
    fn search_term_is_forwarded_verbatim_alongside_filters() {
        let mut view = GridViewState::page(2, 25);
        view.search_term = "  bug ".to_string();
        view.filters
            .insert("state".to_string(), FilterModelEntry::contains("open"));

        let request = build_request(&view).expect("page view should build");

        assert_eq!(request.page, 2);
        assert_eq!(request.page_size, 25);
        assert_eq!(request.offset(), 25);
        assert_eq!(request.search_term.as_deref(), Some("  bug "));
        assert_eq!(request.filters.len(), 1);
        assert_eq!(request.sort_field, None);
    }

    #[test]
    fn zero_page_or_size_is_rejected_not_clamped() {
        assert!(matches!(
            build_request(&GridViewState::page(0, 100)),
            Err(QueryError::InvalidRequest(_))
        ));
        assert!(matches!(
            build_request(&GridViewState::page(1, 0)),
            Err(QueryError::InvalidRequest(_))
        ));
        assert!(matches!(
            build_request(&GridViewState::block(0, 0)),
            Err(QueryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn filter_model_decodes_widget_shape() {
        let model: FilterModel = serde_json::from_str(
            r#"{"title":{"filterType":"text","type":"equals","filter":"fix"}}"#,
        )
        .expect("filter model should decode");

        let filters = translate_filters(&model);

        assert_eq!(filters["title"].filter_type, "equals");
        assert_eq!(filters["title"].value, Value::from("fix"));
    }
}
