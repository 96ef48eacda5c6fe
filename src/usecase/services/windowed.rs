//! Serves row blocks to a virtual-scrolling grid.
//!
//! Each block request is independent: it carries its own filter/sort
//! snapshot and completes with its own block coordinates. A late response
//! for an outdated snapshot is still delivered for the block it was issued
//! for; the grid decides whether it still cares.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::entities::query::QueryError;
use crate::domain::entities::record::Record;
use crate::domain::schema::columns::{build_columns, build_columns_from_records, ColumnDescriptor};
use crate::usecase::ports::notifier::Notifier;
use crate::usecase::ports::query::QueryPort;
use crate::usecase::services::query_builder::{
    build_request, page_for_block, FilterModel, GridViewState, SortModel,
};

const FETCH_FAILED: &str = "Failed to fetch data";
const SCHEMA_FAILED: &str = "Failed to load collection data";

/// What the grid asks for when it needs rows it has not cached.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRequest {
    pub start_row: u64,
    pub filter_model: FilterModel,
    pub sort_model: SortModel,
}

impl BlockRequest {
    pub fn new(start_row: u64) -> Self {
        Self {
            start_row,
            filter_model: FilterModel::new(),
            sort_model: SortModel::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey {
    pub start_row: u64,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockRows {
    pub rows: Vec<Record>,
    pub row_count: u64,
}

/// Completion message for one block: rows plus the total, or the failure
/// that the grid must see so the block does not stay pending.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCompletion {
    pub key: BlockKey,
    pub outcome: Result<BlockRows, QueryError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Idle,
    AwaitingPage,
}

pub struct WindowedAdapter {
    port: Arc<dyn QueryPort>,
    notifier: Arc<dyn Notifier>,
    collection: String,
    search_term: String,
    block_size: u32,
    in_flight: Mutex<BTreeMap<BlockKey, usize>>,
}

/// Keeps the in-flight table honest even if the fetch future is dropped.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<BTreeMap<BlockKey, usize>>,
    key: BlockKey,
}

impl<'a> InFlightGuard<'a> {
    fn enter(in_flight: &'a Mutex<BTreeMap<BlockKey, usize>>, key: BlockKey) -> Self {
        *in_flight.lock().entry(key).or_insert(0) += 1;
        Self { in_flight, key }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        if let Some(count) = in_flight.get_mut(&self.key) {
            *count -= 1;
            if *count == 0 {
                in_flight.remove(&self.key);
            }
        }
    }
}

impl WindowedAdapter {
    pub fn new(
        port: Arc<dyn QueryPort>,
        notifier: Arc<dyn Notifier>,
        collection: impl Into<String>,
        block_size: u32,
    ) -> Self {
        Self {
            port,
            notifier,
            collection: collection.into(),
            search_term: String::new(),
            block_size,
            in_flight: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_search_term(mut self, search_term: impl Into<String>) -> Self {
        self.search_term = search_term.into();
        self
    }

    pub fn state(&self) -> AdapterState {
        if self.in_flight.lock().is_empty() {
            AdapterState::Idle
        } else {
            AdapterState::AwaitingPage
        }
    }

    pub fn pending_blocks(&self) -> Vec<BlockKey> {
        self.in_flight.lock().keys().copied().collect()
    }

    pub fn block_key(&self, start_row: u64) -> BlockKey {
        BlockKey {
            start_row,
            page: page_for_block(start_row, self.block_size),
        }
    }

    /// Fetches the first record only to learn the collection's columns.
    pub async fn fetch_columns(&self) -> Result<Vec<ColumnDescriptor>, QueryError> {
        let outcome = match build_request(&GridViewState::page(1, 1)) {
            Ok(request) => self.port.query_collection(&self.collection, &request).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(response) => {
                if response.fields.is_empty() {
                    Ok(build_columns_from_records(&response.data))
                } else {
                    Ok(build_columns(&response.fields))
                }
            }
            Err(err) => {
                tracing::error!(collection = %self.collection, error = %err, "schema fetch failed");
                self.notifier.error(SCHEMA_FAILED);
                Err(err)
            }
        }
    }

    pub async fn get_rows(&self, request: BlockRequest) -> BlockCompletion {
        let key = self.block_key(request.start_row);
        let view = GridViewState {
            sort: request.sort_model,
            filters: request.filter_model,
            search_term: self.search_term.clone(),
            ..GridViewState::block(request.start_row, self.block_size)
        };
        let query = match build_request(&view) {
            Ok(query) => query,
            Err(err) => {
                tracing::error!(collection = %self.collection, error = %err, "invalid block request");
                self.notifier.error(FETCH_FAILED);
                return BlockCompletion {
                    key,
                    outcome: Err(err),
                };
            }
        };

        let _guard = InFlightGuard::enter(&self.in_flight, key);
        tracing::debug!(
            collection = %self.collection,
            start_row = key.start_row,
            page = key.page,
            offset = query.offset(),
            "fetching row block"
        );

        let outcome = match self.port.query_collection(&self.collection, &query).await {
            Ok(response) => Ok(BlockRows {
                rows: response.data,
                row_count: response.total_count,
            }),
            Err(err) => {
                tracing::error!(
                    collection = %self.collection,
                    start_row = key.start_row,
                    error = %err,
                    "row block fetch failed"
                );
                self.notifier.error(FETCH_FAILED);
                Err(err)
            }
        };

        BlockCompletion { key, outcome }
    }
}
