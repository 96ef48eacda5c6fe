use crate::domain::entities::query::QueryError;
use crate::domain::schema::columns::ColumnDescriptor;
use crate::usecase::services::query_builder::{FilterModel, SortModel};

/// Everything the scrolling view shows besides its rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollSession {
    pub collection: Option<String>,
    pub search_input: String,
    pub columns: Vec<ColumnDescriptor>,
    pub sort: SortModel,
    pub filters: FilterModel,
}

impl ScrollSession {
    /// Switches to `collection` once its schema is known and returns true.
    /// A failed schema load changes nothing, so the installed datasource,
    /// its rows and these models keep describing the same collection.
    pub fn schema_loaded(
        &mut self,
        collection: &str,
        outcome: Result<Vec<ColumnDescriptor>, QueryError>,
    ) -> bool {
        let Ok(columns) = outcome else {
            return false;
        };

        self.collection = Some(collection.to_string());
        self.search_input.clear();
        self.sort.clear();
        self.filters.clear();
        self.columns = columns;
        true
    }

    pub fn block_request_models(&self) -> (FilterModel, SortModel) {
        (self.filters.clone(), self.sort.clone())
    }
}
