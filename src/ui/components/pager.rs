use dioxus::prelude::*;

const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";
const CURRENT_STYLE: &str =
    "border: 1px solid #1f6feb; background: #1f6feb; color: #fff; padding: 4px 10px; border-radius: 6px;";

#[component]
pub fn Pager(
    current_page: u32,
    total_pages: u32,
    total_count: u64,
    page_numbers: Vec<u32>,
    disabled: bool,
    on_previous: EventHandler<()>,
    on_next: EventHandler<()>,
    on_page: EventHandler<u32>,
) -> Element {
    let shown_pages = total_pages.max(1);
    let numbers = page_numbers.into_iter().map(|page| {
        let style = if page == current_page {
            CURRENT_STYLE
        } else {
            BUTTON_STYLE
        };
        rsx! {
            button {
                key: "{page}",
                style: "{style}",
                disabled: disabled,
                onclick: move |_| on_page.call(page),
                "{page}"
            }
        }
    });

    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 6px; margin-top: 8px;",
            button {
                style: BUTTON_STYLE,
                disabled: disabled || current_page <= 1,
                onclick: move |_| on_previous.call(()),
                "Previous"
            }
            {numbers}
            button {
                style: BUTTON_STYLE,
                disabled: disabled || current_page >= total_pages,
                onclick: move |_| on_next.call(()),
                "Next"
            }
            span {
                style: "margin-left: 12px; color: #555;",
                "Page {current_page} of {shown_pages} ({total_count} records)"
            }
        }
    }
}
