use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::ui::components::integrations::IntegrationsPanel;
use crate::ui::components::paged_view::PagedView;
use crate::ui::components::scroll_view::ScrollView;
use crate::ui::state::app_state::{AppServices, AppState, Tab};
use crate::usecase::ports::notifier::{Notice, Severity};

type NoticeInbox = Rc<RefCell<Option<UnboundedReceiver<Notice>>>>;

const TAB_STYLE: &str =
    "border: none; border-bottom: 2px solid transparent; background: none; padding: 8px 14px; cursor: pointer;";
const ACTIVE_TAB_STYLE: &str =
    "border: none; border-bottom: 2px solid #1f6feb; background: none; padding: 8px 14px; font-weight: 600;";

fn notice_style(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "background: #eef4ff; border: 1px solid #9db8f5; color: #1b3a7a;",
        Severity::Success => "background: #ecf8ef; border: 1px solid #8fd19e; color: #1e5a2c;",
        Severity::Error => "background: #fdecec; border: 1px solid #f1a1a1; color: #7a1b1b;",
    }
}

#[component]
pub fn App() -> Element {
    let boot = use_hook(|| {
        AppServices::bootstrap()
            .map(|(services, notices)| {
                let inbox: NoticeInbox = Rc::new(RefCell::new(Some(notices)));
                (services, inbox)
            })
            .map_err(|err| {
                tracing::error!(error = %format!("{err:#}"), "startup failed");
                format!("{err:#}")
            })
    });

    // The bootstrap result never changes, so the hooks below always run in
    // the same order once startup succeeded.
    let (services, inbox) = match boot {
        Ok(booted) => booted,
        Err(err) => {
            return rsx! {
                div {
                    p { "Failed to start: {err}" }
                }
            };
        }
    };

    use_context_provider(|| services.clone());
    let state = AppState::new(services.identity.current());
    use_context_provider(|| state);

    let mut tab = state.tab;
    let mut notices = state.notices;
    let mut user_id = state.user_id;

    use_hook({
        let duration = services.config.notice_duration();
        move || {
            let Some(mut receiver) = inbox.borrow_mut().take() else {
                return;
            };
            spawn(async move {
                while let Some(notice) = receiver.recv().await {
                    notices.write().push(notice.clone());
                    spawn(async move {
                        tokio::time::sleep(duration).await;
                        let mut shown = notices.write();
                        if let Some(idx) = shown.iter().position(|item| item == &notice) {
                            shown.remove(idx);
                        }
                    });
                }
            });
        }
    });

    use_hook({
        let identity = services.identity.clone();
        move || {
            let mut changes = identity.subscribe();
            spawn(async move {
                while changes.changed().await.is_ok() {
                    let current = changes.borrow_and_update().clone();
                    user_id.set(current);
                }
            });
        }
    });

    let active = tab();
    let tabs = [
        (Tab::Paged, "Paged"),
        (Tab::Scrolling, "Scrolling"),
        (Tab::Integrations, "Integrations"),
    ];
    let connected_label = match user_id() {
        Some(_) => "GitHub connected",
        None => "GitHub not connected",
    };

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 12px;",
            div {
                style: "display: flex; align-items: center; border-bottom: 1px solid #ddd; margin-bottom: 12px;",
                for (target, label) in tabs {
                    button {
                        key: "{label}",
                        style: if active == target { ACTIVE_TAB_STYLE } else { TAB_STYLE },
                        onclick: move |_| tab.set(target),
                        "{label}"
                    }
                }
                span { style: "margin-left: auto; color: #666;", "{connected_label}" }
            }
            match active {
                Tab::Paged => rsx! { PagedView {} },
                Tab::Scrolling => rsx! { ScrollView {} },
                Tab::Integrations => rsx! { IntegrationsPanel {} },
            }
            div {
                style: "position: fixed; right: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 6px; max-width: 360px;",
                for (idx, notice) in notices().into_iter().enumerate() {
                    div {
                        key: "{idx}",
                        style: format!("{} padding: 8px 12px; border-radius: 6px;", notice_style(notice.severity)),
                        "{notice.message}"
                    }
                }
            }
        }
    }
}
