use dioxus::prelude::*;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::domain::entities::integration::IntegrationStatus;
use crate::ui::state::app_state::{AppServices, AppState};

const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";

#[component]
pub fn IntegrationsPanel() -> Element {
    let services = use_context::<AppServices>();
    let app_state = use_context::<AppState>();
    let user_id = app_state.user_id;

    let mut status = use_signal(|| None::<IntegrationStatus>);
    let mut busy = use_signal(|| false);
    let mut syncing = use_signal(|| false);
    let mut auth_url = use_signal(|| None::<String>);
    let mut connection_id = use_signal(String::new);

    // Re-read the status whenever the stored identity changes.
    use_effect({
        let services = services.clone();
        move || {
            let _ = user_id();
            let integration = services.integration.clone();
            spawn(async move {
                status.set(Some(integration.check_status().await));
            });
        }
    });

    let connect = {
        let integration = services.integration.clone();
        move |_: MouseEvent| {
            let integration = integration.clone();
            spawn(async move {
                busy.set(true);
                if let Some(url) = integration.authorization_url().await {
                    auth_url.set(Some(url));
                }
                busy.set(false);
            });
        }
    };

    let complete = {
        let integration = services.integration.clone();
        move |_: MouseEvent| {
            let id = connection_id.peek().trim().to_string();
            if id.is_empty() {
                integration.on_connect_failed();
                return;
            }
            integration.on_connected(&id);
            auth_url.set(None);
            connection_id.set(String::new());
        }
    };

    let remove = {
        let integration = services.integration.clone();
        move |_: MouseEvent| {
            let confirm = MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title("Remove integration")
                .set_description("Remove the GitHub integration? Synced data stays on the server.")
                .set_buttons(MessageButtons::YesNo)
                .show();
            if confirm != MessageDialogResult::Yes {
                return;
            }
            let integration = integration.clone();
            spawn(async move {
                busy.set(true);
                if let Some(next) = integration.remove().await {
                    status.set(Some(next));
                }
                busy.set(false);
            });
        }
    };

    let resync = {
        let integration = services.integration.clone();
        move |_: MouseEvent| {
            let integration = integration.clone();
            spawn(async move {
                syncing.set(true);
                if let Some(next) = integration.resync_and_recheck().await {
                    status.set(Some(next));
                }
                syncing.set(false);
            });
        }
    };

    let current = status();
    let is_busy = busy();
    let is_syncing = syncing();
    let display_name = current
        .as_ref()
        .and_then(|status| status.name.clone())
        .unwrap_or_default();
    let username = current
        .as_ref()
        .and_then(|status| status.username.clone())
        .unwrap_or_default();
    let connected_since = current
        .as_ref()
        .map(IntegrationStatus::connected_date_label)
        .unwrap_or_default();
    let last_sync = current
        .as_ref()
        .map(IntegrationStatus::last_sync_label)
        .unwrap_or_default();
    let resync_label = if is_syncing { "Resyncing..." } else { "Resync" };

    rsx! {
        div {
            style: "max-width: 640px; border: 1px solid #ddd; border-radius: 8px; padding: 16px;",
            h3 { "GitHub" }
            match current {
                None => rsx! { p { style: "color: #888;", "Checking status..." } },
                Some(status) if status.connected => rsx! {
                    div {
                        style: "display: flex; gap: 12px; align-items: center;",
                        if let Some(avatar) = status.avatar_url.clone() {
                            img { src: "{avatar}", width: "48", height: "48", style: "border-radius: 50%;" }
                        }
                        div {
                            p { strong { "{display_name}" } }
                            p { "@{username}" }
                            if let Some(email) = status.email.clone() {
                                p { "{email}" }
                            }
                        }
                    }
                    p { "Connected since {connected_since}" }
                    p { "Last synced: {last_sync}" }
                    div {
                        style: "display: flex; gap: 8px;",
                        button {
                            style: BUTTON_STYLE,
                            disabled: is_busy || is_syncing,
                            onclick: resync,
                            "{resync_label}"
                        }
                        button {
                            style: BUTTON_STYLE,
                            disabled: is_busy,
                            onclick: remove,
                            "Remove integration"
                        }
                    }
                },
                Some(_) => rsx! {
                    p { "Not connected" }
                    button {
                        style: BUTTON_STYLE,
                        disabled: is_busy,
                        onclick: connect,
                        "Connect GitHub"
                    }
                    if let Some(url) = auth_url() {
                        div {
                            style: "margin-top: 12px; display: flex; flex-direction: column; gap: 6px;",
                            a { href: "{url}", target: "_blank", "Open GitHub authorization" }
                            label { "Connection id returned after authorization" }
                            input {
                                value: "{connection_id}",
                                oninput: move |event| connection_id.set(event.value()),
                            }
                            button {
                                style: BUTTON_STYLE,
                                onclick: complete,
                                "Complete connection"
                            }
                        }
                    }
                },
            }
        }
    }
}
