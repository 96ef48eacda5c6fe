use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::integration::IntegrationStatus;
use crate::usecase::ports::integration::IntegrationPort;
use crate::usecase::ports::notifier::Notifier;
use crate::usecase::services::session::SessionIdentity;

pub struct IntegrationService {
    port: Arc<dyn IntegrationPort>,
    identity: Arc<SessionIdentity>,
    notifier: Arc<dyn Notifier>,
    recheck_delay: Duration,
}

impl IntegrationService {
    pub fn new(
        port: Arc<dyn IntegrationPort>,
        identity: Arc<SessionIdentity>,
        notifier: Arc<dyn Notifier>,
        recheck_delay: Duration,
    ) -> Self {
        Self {
            port,
            identity,
            notifier,
            recheck_delay,
        }
    }

    /// No stored identity means disconnected, without asking the backend.
    pub async fn check_status(&self) -> IntegrationStatus {
        let Some(user_id) = self.identity.current() else {
            return IntegrationStatus::disconnected();
        };

        match self.port.status(&user_id).await {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(error = %err, "integration status check failed");
                IntegrationStatus::disconnected()
            }
        }
    }

    pub async fn authorization_url(&self) -> Option<String> {
        match self.port.auth_url().await {
            Ok(response) => Some(response.auth_url),
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch authorization url");
                self.notifier
                    .error("Failed to initiate GitHub connection");
                None
            }
        }
    }

    pub fn on_connected(&self, user_id: &str) {
        match self.identity.connect(user_id) {
            Ok(()) => self
                .notifier
                .success("GitHub integration connected successfully!"),
            Err(err) => {
                tracing::error!(error = %err, "failed to store session identity");
                self.notifier.error("Failed to connect GitHub integration");
            }
        }
    }

    pub fn on_connect_failed(&self) {
        self.notifier.error("Failed to connect GitHub integration");
    }

    /// Returns the new status when a removal actually happened.
    pub async fn remove(&self) -> Option<IntegrationStatus> {
        let user_id = self.identity.current()?;

        match self.port.remove(&user_id).await {
            Ok(_) => {
                if let Err(err) = self.identity.disconnect() {
                    tracing::warn!(error = %err, "failed to clear stored session identity");
                }
                self.notifier.success("Integration removed successfully");
                Some(IntegrationStatus::disconnected())
            }
            Err(err) => {
                tracing::error!(error = %err, "integration removal failed");
                self.notifier.error("Failed to remove integration");
                None
            }
        }
    }

    /// Starts a background resync, then reads the status once after the
    /// configured delay.
    pub async fn resync_and_recheck(&self) -> Option<IntegrationStatus> {
        let user_id = self.identity.current()?;

        match self.port.resync(&user_id).await {
            Ok(_) => {
                self.notifier
                    .success("Resync started in background. This may take a few minutes.");
                tokio::time::sleep(self.recheck_delay).await;
                Some(self.check_status().await)
            }
            Err(err) => {
                tracing::error!(error = %err, "integration resync failed");
                self.notifier.error("Failed to start resync");
                None
            }
        }
    }
}
