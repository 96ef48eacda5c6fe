use std::sync::Arc;

use anyhow::Result;
use dioxus::prelude::{use_signal, Signal};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::infra::config::{default_db_path, AppConfig};
use crate::infra::http::client::SyncApiClient;
use crate::infra::sqlite::identity::SqliteIdentityStorage;
use crate::ui::notify::ChannelNotifier;
use crate::usecase::ports::notifier::{Notice, Notifier};
use crate::usecase::services::integration::IntegrationService;
use crate::usecase::services::session::SessionIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Paged,
    Scrolling,
    Integrations,
}

/// Long-lived collaborators shared through the component tree.
#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub api: Arc<SyncApiClient>,
    pub notifier: Arc<dyn Notifier>,
    pub identity: Arc<SessionIdentity>,
    pub integration: Arc<IntegrationService>,
}

impl AppServices {
    pub fn bootstrap() -> Result<(Self, UnboundedReceiver<Notice>)> {
        let config = Arc::new(AppConfig::load()?);
        let storage = Arc::new(SqliteIdentityStorage::open(default_db_path()?)?);
        let identity = Arc::new(SessionIdentity::load(storage));
        let (notifier, notices) = ChannelNotifier::channel();
        let notifier: Arc<dyn Notifier> = Arc::new(notifier);
        let api = Arc::new(SyncApiClient::new(config.api_base_url.clone()));
        let integration = Arc::new(IntegrationService::new(
            api.clone(),
            identity.clone(),
            notifier.clone(),
            config.resync_recheck_delay(),
        ));

        tracing::info!(api = %config.api_base_url, "services ready");

        Ok((
            Self {
                config,
                api,
                notifier,
                identity,
                integration,
            },
            notices,
        ))
    }
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub tab: Signal<Tab>,
    pub notices: Signal<Vec<Notice>>,
    pub user_id: Signal<Option<String>>,
}

impl AppState {
    pub fn new(initial_user_id: Option<String>) -> Self {
        Self {
            tab: use_signal(|| Tab::Paged),
            notices: use_signal(Vec::<Notice>::new),
            user_id: use_signal(move || initial_user_id),
        }
    }
}
