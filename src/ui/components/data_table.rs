use dioxus::prelude::*;

use crate::domain::entities::query::SortDirection;
use crate::domain::entities::record::{Record, Value};
use crate::domain::schema::columns::{ColumnDescriptor, FilterKind, FilterOperator};
use crate::usecase::services::query_builder::{
    FilterModel, FilterModelEntry, SortModel, SortModelEntry,
};

/// Header click cycles ascending, descending, unsorted. Clicking a new
/// column replaces the previous sort.
pub fn next_sort(sort: &SortModel, field: &str) -> SortModel {
    let current = sort
        .iter()
        .find(|entry| entry.col_id == field)
        .map(|entry| entry.sort);

    match current {
        None => vec![SortModelEntry::new(field, SortDirection::Asc)],
        Some(SortDirection::Asc) => vec![SortModelEntry::new(field, SortDirection::Desc)],
        Some(SortDirection::Desc) => Vec::new(),
    }
}

/// Operator currently chosen for a column that offers a choice.
fn chosen_operator(filters: &FilterModel, column: &ColumnDescriptor) -> Option<FilterOperator> {
    filters
        .get(&column.field)
        .and_then(|entry| entry.operator.as_deref())
        .and_then(FilterOperator::from_name)
        .or_else(|| column.filter_operators.first().copied())
}

/// Filter model after the user typed `text` into `column`'s filter box.
/// Columns with an operator list keep the operator picked for them, even
/// while the box is empty.
pub fn with_filter(filters: &FilterModel, column: &ColumnDescriptor, text: &str) -> FilterModel {
    let mut next = filters.clone();
    let operator = chosen_operator(filters, column);
    if text.is_empty() {
        match operator.filter(|_| !column.filter_operators.is_empty()) {
            Some(operator) => {
                next.insert(
                    column.field.clone(),
                    FilterModelEntry {
                        filter_type: Some("text".to_string()),
                        operator: Some(operator.as_str().to_string()),
                        filter: None,
                    },
                );
            }
            None => {
                next.shift_remove(&column.field);
            }
        }
        return next;
    }

    let entry = match column.filter {
        FilterKind::Text => match operator {
            Some(operator) => FilterModelEntry::contains(text).with_operator(operator.as_str()),
            None => FilterModelEntry::contains(text),
        },
        FilterKind::NumberRange => {
            let value = text
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::from(text));
            FilterModelEntry {
                filter_type: Some("number".to_string()),
                operator: Some("equals".to_string()),
                filter: Some(value),
            }
        }
        FilterKind::DateRange => FilterModelEntry {
            filter_type: Some("date".to_string()),
            operator: Some("equals".to_string()),
            filter: Some(Value::from(text)),
        },
    };
    next.insert(column.field.clone(), entry);
    next
}

/// Filter model after the user picked `operator` for `column`. The typed
/// value, if any, is kept.
pub fn with_filter_operator(
    filters: &FilterModel,
    column: &ColumnDescriptor,
    operator: FilterOperator,
) -> FilterModel {
    let mut next = filters.clone();
    let entry = next
        .entry(column.field.clone())
        .or_insert_with(|| FilterModelEntry {
            filter_type: Some("text".to_string()),
            ..FilterModelEntry::default()
        });
    entry.operator = Some(operator.as_str().to_string());
    next
}

fn filter_text(filters: &FilterModel, field: &str) -> String {
    filters
        .get(field)
        .and_then(|entry| entry.filter.as_ref())
        .map(Value::to_cell_text)
        .unwrap_or_default()
}

fn sort_marker(sort: &SortModel, field: &str) -> &'static str {
    match sort.iter().find(|entry| entry.col_id == field).map(|e| e.sort) {
        Some(SortDirection::Asc) => " ▲",
        Some(SortDirection::Desc) => " ▼",
        None => "",
    }
}

fn column_style(column: &ColumnDescriptor) -> String {
    let mut style = String::from(
        "border: 1px solid #ccc; padding: 4px 8px; text-align: left; white-space: nowrap;",
    );
    if let Some(width) = column.width {
        style.push_str(&format!(" width: {width}px; min-width: {width}px;"));
    }
    if column.is_discriminator() {
        style.push_str(" font-weight: 600;");
    }
    if column.pinned_left {
        style.push_str(" position: sticky; left: 0; background: #f7f7f7; z-index: 1;");
    }
    style
}

#[component]
pub fn DataTable(
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Record>,
    sort: SortModel,
    filters: FilterModel,
    #[props(default = true)] interactive: bool,
    on_sort: EventHandler<SortModel>,
    on_filter: EventHandler<FilterModel>,
) -> Element {
    if columns.is_empty() {
        return rsx! {
            p { style: "color: #666;", "No columns to display" }
        };
    }

    let header_cells = columns.iter().map(|column| {
        let field = column.field.clone();
        let sort_for_click = sort.clone();
        let marker = sort_marker(&sort, &column.field);
        let sortable = interactive && column.sortable;
        rsx! {
            th {
                key: "{column.field}",
                style: format!("{} cursor: pointer;", column_style(column)),
                title: "{column.field}",
                onclick: move |_| {
                    if sortable {
                        on_sort.call(next_sort(&sort_for_click, &field));
                    }
                },
                "{column.header}{marker}"
            }
        }
    });

    let filter_cells = columns.iter().map(|column| {
        let current = filter_text(&filters, &column.field);
        let widget = column.filter.widget_name();
        let column_for_input = column.clone();
        let filters_for_input = filters.clone();
        let column_for_select = column.clone();
        let filters_for_select = filters.clone();
        let placeholder = match column.filter {
            FilterKind::Text => "filter",
            FilterKind::NumberRange => "equals number",
            FilterKind::DateRange => "YYYY-MM-DD",
        };
        let selected = chosen_operator(&filters, column);
        // One condition per column; AND/OR combinations are never offered.
        let select_title = if column.suppress_and_or {
            "single condition"
        } else {
            "operator"
        };
        let options = column.filter_operators.iter().map(|operator| {
            let name = operator.as_str();
            let label = operator.label();
            rsx! {
                option {
                    key: "{name}",
                    value: "{name}",
                    selected: selected == Some(*operator),
                    "{label}"
                }
            }
        });
        let has_operators = !column.filter_operators.is_empty();
        rsx! {
            th {
                key: "filter-{column.field}",
                style: column_style(column),
                if has_operators {
                    select {
                        title: "{select_title}",
                        disabled: !interactive,
                        style: "margin-right: 4px;",
                        onchange: move |event| {
                            if let Some(operator) = FilterOperator::from_name(&event.value()) {
                                on_filter.call(with_filter_operator(
                                    &filters_for_select,
                                    &column_for_select,
                                    operator,
                                ));
                            }
                        },
                        {options}
                    }
                }
                input {
                    title: "{widget}",
                    disabled: !interactive,
                    value: "{current}",
                    placeholder: "{placeholder}",
                    onchange: move |event| {
                        on_filter.call(with_filter(&filters_for_input, &column_for_input, &event.value()));
                    },
                }
            }
        }
    });

    let body_rows = rows.iter().enumerate().map(|(idx, row)| {
        let cells = columns.iter().map(|column| {
            let text = column.cell_text(row);
            rsx! {
                td { key: "{column.field}", style: column_style(column), "{text}" }
            }
        });
        rsx! {
            tr { key: "{idx}", {cells} }
        }
    });

    rsx! {
        div {
            style: "overflow: auto; max-height: 70vh; border: 1px solid #ddd;",
            table {
                style: "border-collapse: collapse; width: 100%;",
                thead {
                    tr { {header_cells} }
                    tr { {filter_cells} }
                }
                tbody { {body_rows} }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::query::{FieldDefinition, FieldType};
    use crate::usecase::services::query_builder::translate_filters;

    #[test]
    fn sort_cycles_through_three_states() {
        let first = next_sort(&Vec::new(), "stars");
        assert_eq!(first, vec![SortModelEntry::new("stars", SortDirection::Asc)]);

        let second = next_sort(&first, "stars");
        assert_eq!(second, vec![SortModelEntry::new("stars", SortDirection::Desc)]);

        assert!(next_sort(&second, "stars").is_empty());
        assert_eq!(
            next_sort(&second, "name"),
            vec![SortModelEntry::new("name", SortDirection::Asc)]
        );
    }

    #[test]
    fn number_filters_send_numeric_equality() {
        let column = ColumnDescriptor::for_field(&FieldDefinition::new("stars", FieldType::Number));

        let filters = with_filter(&FilterModel::new(), &column, "12");

        assert_eq!(filters["stars"].operator.as_deref(), Some("equals"));
        assert_eq!(filters["stars"].filter, Some(Value::Number(12.0)));
        assert!(with_filter(&filters, &column, "").is_empty());
    }

    #[test]
    fn boolean_filters_offer_all_three_operators() {
        let column =
            ColumnDescriptor::for_field(&FieldDefinition::new("archived", FieldType::Boolean));

        let typed = with_filter(&FilterModel::new(), &column, "true");
        assert_eq!(typed["archived"].operator.as_deref(), Some("contains"));

        let equals = with_filter_operator(&typed, &column, FilterOperator::Equals);
        assert_eq!(equals["archived"].operator.as_deref(), Some("equals"));
        assert_eq!(equals["archived"].filter, Some(Value::from("true")));
        assert_eq!(translate_filters(&equals)["archived"].filter_type, "equals");

        let picked_first =
            with_filter_operator(&FilterModel::new(), &column, FilterOperator::NotContains);
        let negated = with_filter(&picked_first, &column, "false");
        assert_eq!(
            translate_filters(&negated)["archived"].filter_type,
            "notContains"
        );

        let cleared = with_filter(&negated, &column, "");
        assert_eq!(cleared["archived"].operator.as_deref(), Some("notContains"));
        assert!(translate_filters(&cleared).is_empty());
    }

    #[test]
    fn plain_text_filters_keep_the_default_operator() {
        let column = ColumnDescriptor::for_field(&FieldDefinition::new("name", FieldType::String));

        let filters = with_filter(&FilterModel::new(), &column, "oct");

        assert_eq!(filters["name"].operator, None);
        assert_eq!(translate_filters(&filters)["name"].filter_type, "contains");
    }
}
