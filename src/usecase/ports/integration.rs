use async_trait::async_trait;

use crate::domain::entities::integration::{ApiAck, AuthUrl, IntegrationStatus, ResyncAck};
use crate::domain::entities::query::QueryError;

#[async_trait]
pub trait IntegrationPort: Send + Sync {
    async fn auth_url(&self) -> Result<AuthUrl, QueryError>;
    async fn status(&self, user_id: &str) -> Result<IntegrationStatus, QueryError>;
    async fn remove(&self, user_id: &str) -> Result<ApiAck, QueryError>;
    async fn resync(&self, user_id: &str) -> Result<ResyncAck, QueryError>;
}
