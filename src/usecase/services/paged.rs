//! Explicit page cursor over one collection or over a cross-collection
//! search.
//!
//! Transitions are synchronous and hand back at most one [`PagedCommand`].
//! The caller runs it with [`execute`] and feeds the [`PagedCompletion`]
//! into [`PagedAdapter::apply`], which updates rows, totals and columns in
//! one step. Completions are applied in arrival order; a slow response to
//! an older command still overwrites a newer one.

use std::sync::Arc;

use crate::domain::entities::query::{
    total_pages, GlobalSearchRequest, GlobalSearchResponse, QueryError, QueryRequest,
    QueryResponse,
};
use crate::domain::entities::record::Record;
use crate::domain::schema::columns::{
    build_columns, build_columns_from_records, build_columns_from_samples, ColumnDescriptor,
};
use crate::usecase::ports::notifier::Notifier;
use crate::usecase::ports::query::QueryPort;
use crate::usecase::services::global_search::flatten;
use crate::usecase::services::query_builder::{
    build_request, FilterModel, GridViewState, SortModel,
};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
const PAGE_STRIP_LEN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Collection,
    Global,
}

/// Why a collection query was issued; picks the failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    Navigate,
    Sort,
    Filter,
}

impl LoadReason {
    fn failure_message(&self) -> &'static str {
        match self {
            LoadReason::Navigate => "Failed to load collection data",
            LoadReason::Sort => "Failed to sort data",
            LoadReason::Filter => "Failed to filter data",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PagedCommand {
    ListCollections,
    Collection {
        collection: String,
        request: QueryRequest,
        reason: LoadReason,
    },
    Global {
        request: GlobalSearchRequest,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PagedCompletion {
    Collections(Result<Vec<String>, QueryError>),
    Collection {
        reason: LoadReason,
        outcome: Result<QueryResponse, QueryError>,
    },
    Global {
        search_term: String,
        outcome: Result<GlobalSearchResponse, QueryError>,
    },
}

/// Runs one command against the backend. Transport failures are logged and
/// surfaced here, once, before the completion is handed back.
pub async fn execute(
    port: &dyn QueryPort,
    notifier: &dyn Notifier,
    command: PagedCommand,
) -> PagedCompletion {
    match command {
        PagedCommand::ListCollections => {
            let outcome = port.list_collections().await;
            if let Err(err) = &outcome {
                tracing::error!(error = %err, "listing collections failed");
                notifier.error("Failed to load collections");
            }
            PagedCompletion::Collections(outcome)
        }
        PagedCommand::Collection {
            collection,
            request,
            reason,
        } => {
            let outcome = port.query_collection(&collection, &request).await;
            if let Err(err) = &outcome {
                tracing::error!(
                    collection = %collection,
                    page = request.page,
                    ?reason,
                    error = %err,
                    "collection query failed"
                );
                notifier.error(reason.failure_message());
            }
            PagedCompletion::Collection { reason, outcome }
        }
        PagedCommand::Global { request } => {
            let outcome = port.global_search(&request).await;
            if let Err(err) = &outcome {
                tracing::error!(search_term = %request.search_term, error = %err, "global search failed");
                notifier.error("Failed to perform global search");
            }
            PagedCompletion::Global {
                search_term: request.search_term,
                outcome,
            }
        }
    }
}

pub struct PagedAdapter {
    notifier: Arc<dyn Notifier>,
    pub collections: Vec<String>,
    pub selected_collection: Option<String>,
    pub search_mode: SearchMode,
    pub search_term: String,
    pub sort: SortModel,
    pub filters: FilterModel,
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub rows: Vec<Record>,
    pub columns: Vec<ColumnDescriptor>,
    /// Commands handed out and not yet applied.
    outstanding: usize,
}

impl PagedAdapter {
    pub fn new(notifier: Arc<dyn Notifier>, page_size: u32) -> Self {
        Self {
            notifier,
            collections: Vec::new(),
            selected_collection: None,
            search_mode: SearchMode::Collection,
            search_term: String::new(),
            sort: SortModel::new(),
            filters: FilterModel::new(),
            current_page: 1,
            page_size,
            total_count: 0,
            total_pages: 0,
            rows: Vec::new(),
            columns: Vec::new(),
            outstanding: 0,
        }
    }

    /// True while any issued command still awaits its completion.
    pub fn is_loading(&self) -> bool {
        self.outstanding > 0
    }

    pub fn load_collections(&mut self) -> Option<PagedCommand> {
        self.outstanding += 1;
        Some(PagedCommand::ListCollections)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn select_collection(&mut self, collection: impl Into<String>) -> Option<PagedCommand> {
        let collection = collection.into();
        if collection.is_empty() {
            return None;
        }

        self.selected_collection = Some(collection);
        self.search_term.clear();
        self.sort.clear();
        self.filters.clear();
        self.current_page = 1;
        self.search_mode = SearchMode::Collection;
        self.collection_command(1, LoadReason::Navigate)
    }

    /// Entering global mode drops every trace of the collection view; the
    /// two modes never share a column model.
    pub fn set_search_mode(&mut self, mode: SearchMode) -> Option<PagedCommand> {
        self.search_mode = mode;
        self.search_term.clear();
        self.current_page = 1;

        match mode {
            SearchMode::Collection => self.collection_command(1, LoadReason::Navigate),
            SearchMode::Global => {
                self.clear_results();
                None
            }
        }
    }

    pub fn search(&mut self) -> Option<PagedCommand> {
        self.page_command(1)
    }

    pub fn clear_search(&mut self) -> Option<PagedCommand> {
        self.search_term.clear();
        self.current_page = 1;

        match self.search_mode {
            SearchMode::Global => {
                self.clear_results();
                None
            }
            SearchMode::Collection => self.collection_command(1, LoadReason::Navigate),
        }
    }

    pub fn next_page(&mut self) -> Option<PagedCommand> {
        if self.current_page >= self.total_pages {
            return None;
        }
        self.page_command(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Option<PagedCommand> {
        if self.current_page <= 1 {
            return None;
        }
        self.page_command(self.current_page - 1)
    }

    pub fn go_to_page(&mut self, page: u32) -> Option<PagedCommand> {
        if page < 1 || page > self.total_pages {
            return None;
        }
        self.page_command(page)
    }

    /// Sorting is a collection-mode feature; the page resets because the
    /// row order changed underneath it.
    pub fn sort_changed(&mut self, sort: SortModel) -> Option<PagedCommand> {
        if self.search_mode == SearchMode::Global {
            return None;
        }
        self.sort = sort;
        self.current_page = 1;
        self.collection_command(1, LoadReason::Sort)
    }

    pub fn filter_changed(&mut self, filters: FilterModel) -> Option<PagedCommand> {
        if self.search_mode == SearchMode::Global {
            return None;
        }
        self.filters = filters;
        self.current_page = 1;
        self.collection_command(1, LoadReason::Filter)
    }

    /// Up to five page numbers around the current page, kept in range.
    pub fn page_numbers(&self) -> Vec<u32> {
        let mut start = self
            .current_page
            .saturating_sub(PAGE_STRIP_LEN / 2)
            .max(1);
        let end = self.total_pages.min(start + PAGE_STRIP_LEN - 1);
        if end + 1 < start + PAGE_STRIP_LEN {
            start = (end + 1).saturating_sub(PAGE_STRIP_LEN).max(1);
        }
        (start..=end).collect()
    }

    pub fn view_state(&self) -> GridViewState {
        self.view_at(self.current_page)
    }

    fn view_at(&self, page: u32) -> GridViewState {
        GridViewState {
            sort: self.sort.clone(),
            filters: self.filters.clone(),
            search_term: self.search_term.clone(),
            ..GridViewState::page(page, self.page_size)
        }
    }

    /// The cursor moves to `page` only when a query for it is issued.
    fn page_command(&mut self, page: u32) -> Option<PagedCommand> {
        let command = match self.search_mode {
            SearchMode::Global => self.global_command(page),
            SearchMode::Collection => self.collection_command(page, LoadReason::Navigate),
        }?;
        self.current_page = page;
        Some(command)
    }

    fn collection_command(&mut self, page: u32, reason: LoadReason) -> Option<PagedCommand> {
        let collection = self.selected_collection.clone()?;
        let request = match build_request(&self.view_at(page)) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(collection = %collection, page, error = %err, "collection query not sent");
                self.notifier.error(reason.failure_message());
                return None;
            }
        };
        self.outstanding += 1;
        Some(PagedCommand::Collection {
            collection,
            request,
            reason,
        })
    }

    fn global_command(&mut self, page: u32) -> Option<PagedCommand> {
        if self.search_term.trim().is_empty() {
            self.notifier.info("Please enter a search term");
            return None;
        }
        self.outstanding += 1;
        Some(PagedCommand::Global {
            request: GlobalSearchRequest {
                search_term: self.search_term.clone(),
                page,
                page_size: self.page_size,
            },
        })
    }

    fn clear_results(&mut self) {
        self.rows.clear();
        self.columns.clear();
        self.total_count = 0;
        self.total_pages = 0;
    }

    /// Applies one completion. Returns a follow-up command when the
    /// completion implies one (first collection auto-selected on load).
    pub fn apply(&mut self, completion: PagedCompletion) -> Option<PagedCommand> {
        self.outstanding = self.outstanding.saturating_sub(1);

        match completion {
            PagedCompletion::Collections(Ok(collections)) => {
                self.collections = collections;
                if self.selected_collection.is_none() {
                    if let Some(first) = self.collections.first().cloned() {
                        self.selected_collection = Some(first);
                        return self.collection_command(self.current_page, LoadReason::Navigate);
                    }
                }
                None
            }
            PagedCompletion::Collection {
                outcome: Ok(response),
                ..
            } => {
                self.apply_collection_response(response);
                None
            }
            PagedCompletion::Global {
                search_term,
                outcome: Ok(response),
            } => {
                self.apply_global_response(&search_term, response);
                None
            }
            PagedCompletion::Collections(Err(_))
            | PagedCompletion::Collection { outcome: Err(_), .. }
            | PagedCompletion::Global { outcome: Err(_), .. } => None,
        }
    }

    fn apply_collection_response(&mut self, response: QueryResponse) {
        if !response.is_consistent() {
            tracing::warn!(
                declared = response.total_pages,
                computed = response.computed_total_pages(),
                total_count = response.total_count,
                rows = response.data.len(),
                "backend paging metadata disagrees with totals"
            );
        }
        let computed_pages = total_pages(response.total_count, self.page_size);

        let columns = if !response.fields.is_empty() {
            Some(build_columns(&response.fields))
        } else if !response.data.is_empty() {
            Some(build_columns_from_records(&response.data))
        } else {
            None
        };

        if let Some(columns) = columns {
            if columns != self.columns {
                tracing::debug!(count = columns.len(), "rebuilding column model");
            }
            self.columns = columns;
        }
        self.rows = response.data;
        self.total_count = response.total_count;
        self.total_pages = computed_pages;
        self.current_page = self.current_page.clamp(1, self.total_pages.max(1));
    }

    fn apply_global_response(&mut self, search_term: &str, response: GlobalSearchResponse) {
        let flattened = flatten(&response.results);

        self.columns = build_columns_from_samples(&flattened.records);
        self.total_count = flattened.total_count;
        self.total_pages = total_pages(flattened.total_count, self.page_size);
        self.rows = flattened.records;

        if self.rows.is_empty() {
            self.notifier
                .info(&format!("No results found for \"{search_term}\""));
        } else {
            self.notifier.success(&format!(
                "Found {} results across {} collections",
                self.total_count,
                response.results.len()
            ));
        }
    }
}
