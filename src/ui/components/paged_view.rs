use dioxus::prelude::*;

use crate::infra::export::csv::ExportSource;
use crate::ui::components::data_table::DataTable;
use crate::ui::components::export::save_csv;
use crate::ui::components::pager::Pager;
use crate::ui::state::app_state::AppServices;
use crate::usecase::services::paged::{execute, PagedAdapter, PagedCommand, SearchMode};

const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";

/// Runs a command and any follow-up the adapter asks for after applying it.
async fn drive_paged(services: AppServices, mut paged: Signal<PagedAdapter>, command: PagedCommand) {
    let mut next = Some(command);
    while let Some(command) = next.take() {
        let completion = execute(services.api.as_ref(), services.notifier.as_ref(), command).await;
        next = paged.write().apply(completion);
    }
}

#[component]
pub fn PagedView() -> Element {
    let services = use_context::<AppServices>();
    let notifier = services.notifier.clone();
    let mut paged = use_signal({
        let notifier = services.notifier.clone();
        let page_size = services.config.page_size;
        move || PagedAdapter::new(notifier, page_size)
    });

    let dispatch = use_callback({
        let services = services.clone();
        move |command: Option<PagedCommand>| {
            if let Some(command) = command {
                spawn(drive_paged(services.clone(), paged, command));
            }
        }
    });

    use_hook(move || {
        let command = paged.write().load_collections();
        dispatch.call(command);
    });

    let state = paged.read();
    let collections = state.collections.clone();
    let selected = state.selected_collection.clone().unwrap_or_default();
    let mode = state.search_mode;
    let search_term = state.search_term.clone();
    let columns = state.columns.clone();
    let rows = state.rows.clone();
    let sort = state.sort.clone();
    let filters = state.filters.clone();
    let current_page = state.current_page;
    let total_pages = state.total_pages;
    let total_count = state.total_count;
    let page_numbers = state.page_numbers();
    let loading = state.is_loading();
    drop(state);

    let mode_value = match mode {
        SearchMode::Collection => "collection",
        SearchMode::Global => "global",
    };
    let placeholder = match mode {
        SearchMode::Collection => "Search this collection",
        SearchMode::Global => "Search all collections",
    };

    let export_columns = columns.clone();
    let export_rows = rows.clone();
    let export_collection = selected.clone();
    let export_term = search_term.clone();

    rsx! {
        div {
            style: "display: flex; flex-wrap: wrap; gap: 8px; align-items: center; margin-bottom: 8px;",
            label { "Mode" }
            select {
                value: "{mode_value}",
                onchange: move |event| {
                    let mode = if event.value() == "global" {
                        SearchMode::Global
                    } else {
                        SearchMode::Collection
                    };
                    let command = paged.write().set_search_mode(mode);
                    dispatch.call(command);
                },
                option { value: "collection", "Collection" }
                option { value: "global", "Global search" }
            }
            if mode == SearchMode::Collection {
                label { "Collection" }
                select {
                    value: "{selected}",
                    onchange: move |event| {
                        let command = paged.write().select_collection(event.value());
                        dispatch.call(command);
                    },
                    for collection in collections.iter() {
                        option { key: "{collection}", value: "{collection}", "{collection}" }
                    }
                }
            }
            input {
                style: "min-width: 240px;",
                value: "{search_term}",
                placeholder: "{placeholder}",
                oninput: move |event| paged.write().set_search_term(event.value()),
                onkeydown: move |event| {
                    if event.key() == Key::Enter {
                        let command = paged.write().search();
                        dispatch.call(command);
                    }
                },
            }
            button {
                style: BUTTON_STYLE,
                disabled: loading,
                onclick: move |_| {
                    let command = paged.write().search();
                    dispatch.call(command);
                },
                "Search"
            }
            button {
                style: BUTTON_STYLE,
                disabled: loading,
                onclick: move |_| {
                    let command = paged.write().clear_search();
                    dispatch.call(command);
                },
                "Clear"
            }
            button {
                style: BUTTON_STYLE,
                onclick: move |_| {
                    let source = match mode {
                        SearchMode::Collection => ExportSource::Collection(&export_collection),
                        SearchMode::Global => ExportSource::GlobalSearch(&export_term),
                    };
                    save_csv(notifier.as_ref(), source, &export_columns, &export_rows);
                },
                "Export CSV"
            }
            if loading {
                span { style: "color: #888;", "Loading..." }
            }
        }
        DataTable {
            columns,
            rows,
            sort,
            filters,
            interactive: mode == SearchMode::Collection,
            on_sort: move |sort| {
                let command = paged.write().sort_changed(sort);
                dispatch.call(command);
            },
            on_filter: move |filters| {
                let command = paged.write().filter_changed(filters);
                dispatch.call(command);
            },
        }
        Pager {
            current_page,
            total_pages,
            total_count,
            page_numbers,
            disabled: loading,
            on_previous: move |_| {
                let command = paged.write().previous_page();
                dispatch.call(command);
            },
            on_next: move |_| {
                let command = paged.write().next_page();
                dispatch.call(command);
            },
            on_page: move |page| {
                let command = paged.write().go_to_page(page);
                dispatch.call(command);
            },
        }
    }
}
