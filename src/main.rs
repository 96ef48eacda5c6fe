use dioxus::desktop::{Config, WindowBuilder};
use tracing_subscriber::{fmt, EnvFilter};

mod app;

mod domain {
    pub mod entities {
        pub mod integration;
        pub mod query;
        pub mod record;
    }
    pub mod schema {
        pub mod columns;
        pub mod infer;
    }
}

mod usecase {
    pub mod ports {
        pub mod identity;
        pub mod integration;
        pub mod notifier;
        pub mod query;
    }
    pub mod services {
        pub mod global_search;
        pub mod integration;
        pub mod paged;
        pub mod query_builder;
        pub mod session;
        pub mod windowed;
    }
}

mod infra {
    pub mod config;
    pub mod export {
        pub mod csv;
    }
    pub mod http {
        pub mod client;
    }
    pub mod sqlite {
        pub mod identity;
        pub mod schema;
    }
}

mod ui {
    pub mod components {
        pub mod data_table;
        pub mod export;
        pub mod integrations;
        pub mod paged_view;
        pub mod pager;
        pub mod scroll_view;
    }
    pub mod grid {
        pub mod block_cache;
        pub mod scroll_session;
    }
    pub mod notify;
    pub mod state {
        pub mod app_state;
    }
}


use app::App;
use infra::config::default_webview_data_dir;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() {
    init_tracing();

    let mut config =
        Config::new().with_window(WindowBuilder::new().with_title("Sync Grid"));
    match default_webview_data_dir() {
        Ok(webview_data_dir) => config = config.with_data_directory(webview_data_dir),
        Err(err) => tracing::warn!(error = %err, "using default webview data directory"),
    }

    dioxus::LaunchBuilder::desktop().with_cfg(config).launch(App);
}
