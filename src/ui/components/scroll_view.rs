use std::sync::Arc;

use dioxus::prelude::*;

use crate::infra::export::csv::ExportSource;
use crate::ui::components::data_table::DataTable;
use crate::ui::components::export::save_csv;
use crate::ui::grid::block_cache::{BlockCache, BlockStatus};
use crate::ui::grid::scroll_session::ScrollSession;
use crate::ui::state::app_state::AppServices;
use crate::usecase::ports::query::QueryPort;
use crate::usecase::services::query_builder::{FilterModel, SortModel};
use crate::usecase::services::windowed::{BlockRequest, WindowedAdapter};

const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";

#[component]
pub fn ScrollView() -> Element {
    let services = use_context::<AppServices>();
    let block_size = services.config.cache_block_size;
    let max_blocks = services.config.max_blocks_in_cache;

    let mut collections = use_signal(Vec::<String>::new);
    let mut session = use_signal(ScrollSession::default);
    let mut cache = use_signal(move || BlockCache::new(block_size, max_blocks));
    let mut adapter = use_signal(|| None::<Arc<WindowedAdapter>>);

    let fetch_block = use_callback(move |row: u64| {
        let Some(current) = adapter.peek().clone() else {
            return;
        };
        let Some(start_row) = cache.write().request(row) else {
            return;
        };
        let (filter_model, sort_model) = session.peek().block_request_models();
        let request = BlockRequest {
            start_row,
            filter_model,
            sort_model,
        };
        spawn(async move {
            let completion = current.get_rows(request).await;
            cache.write().apply(completion);
        });
    });

    // A new datasource starts from an empty cache at row zero.
    let install = use_callback({
        let services = services.clone();
        move |(collection, search_term): (String, String)| {
            let windowed = WindowedAdapter::new(
                services.api.clone(),
                services.notifier.clone(),
                collection,
                block_size,
            )
            .with_search_term(search_term);
            adapter.set(Some(Arc::new(windowed)));
            cache.write().reset();
            fetch_block.call(0);
        }
    });

    // Nothing visible changes until the new collection's schema is known.
    let load_collection = use_callback({
        let services = services.clone();
        move |collection: String| {
            let schema = WindowedAdapter::new(
                services.api.clone(),
                services.notifier.clone(),
                collection.clone(),
                block_size,
            );
            spawn(async move {
                let outcome = schema.fetch_columns().await;
                if session.write().schema_loaded(&collection, outcome) {
                    install.call((collection, String::new()));
                }
            });
        }
    });

    use_hook({
        let services = services.clone();
        move || {
            spawn(async move {
                match services.api.list_collections().await {
                    Ok(list) => {
                        let first = list.first().cloned();
                        collections.set(list);
                        if let Some(first) = first {
                            load_collection.call(first);
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "listing collections failed");
                        services.notifier.error("Failed to load collections");
                    }
                }
            });
        }
    });

    let mut reload = move || {
        if adapter.peek().is_some() {
            cache.write().reset();
            fetch_block.call(0);
        }
    };

    let cache_view = cache.read();
    let rows = cache_view.loaded_records();
    let first_row = cache_view.rows().first().map(|(idx, _)| *idx).unwrap_or(0);
    let row_count = cache_view.row_count();
    let next_block = cache_view.next_block();
    let loading = cache_view.is_loading();
    let failed_block = next_block
        .filter(|start| cache_view.status(*start) == Some(BlockStatus::Failed));
    drop(cache_view);

    let current = session();
    let collection_list = collections();
    let selected_value = current.collection.clone().unwrap_or_default();
    let search_value = current.search_input.clone();
    let last_row = first_row + rows.len() as u64;
    let total_label = row_count
        .map(|total| total.to_string())
        .unwrap_or_else(|| "?".to_string());

    let export_columns = current.columns.clone();
    let export_rows = rows.clone();
    let export_collection = selected_value.clone();
    let notifier = services.notifier.clone();

    rsx! {
        div {
            style: "display: flex; flex-wrap: wrap; gap: 8px; align-items: center; margin-bottom: 8px;",
            label { "Collection" }
            select {
                value: "{selected_value}",
                onchange: move |event| {
                    let value = event.value();
                    if !value.is_empty() {
                        load_collection.call(value);
                    }
                },
                for collection in collection_list.iter() {
                    option { key: "{collection}", value: "{collection}", "{collection}" }
                }
            }
            input {
                style: "min-width: 240px;",
                value: "{search_value}",
                placeholder: "Search this collection",
                oninput: move |event| session.write().search_input = event.value(),
            }
            button {
                style: BUTTON_STYLE,
                onclick: move |_| {
                    let current = session.peek().clone();
                    if let Some(collection) = current.collection {
                        install.call((collection, current.search_input));
                    }
                },
                "Search"
            }
            button {
                style: BUTTON_STYLE,
                onclick: move |_| {
                    session.write().search_input.clear();
                    let collection = session.peek().collection.clone();
                    if let Some(collection) = collection {
                        install.call((collection, String::new()));
                    }
                },
                "Clear"
            }
            button {
                style: BUTTON_STYLE,
                onclick: move |_| {
                    save_csv(
                        notifier.as_ref(),
                        ExportSource::Collection(&export_collection),
                        &export_columns,
                        &export_rows,
                    );
                },
                "Export CSV"
            }
            span {
                style: "color: #555;",
                "Rows {first_row}-{last_row} of {total_label}"
            }
        }
        DataTable {
            columns: current.columns,
            rows,
            sort: current.sort,
            filters: current.filters,
            on_sort: move |next: SortModel| {
                session.write().sort = next;
                reload();
            },
            on_filter: move |next: FilterModel| {
                session.write().filters = next;
                reload();
            },
        }
        div {
            style: "margin-top: 8px; display: flex; gap: 8px; align-items: center;",
            if loading {
                span { style: "color: #888;", "Loading..." }
            } else if let Some(start) = failed_block {
                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| fetch_block.call(start),
                    "Retry"
                }
            } else if let Some(start) = next_block {
                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| fetch_block.call(start),
                    "Load more"
                }
            }
        }
    }
}
