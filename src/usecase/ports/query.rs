use async_trait::async_trait;

pub use crate::domain::entities::query::QueryError;
use crate::domain::entities::query::{
    GlobalSearchRequest, GlobalSearchResponse, QueryRequest, QueryResponse,
};

/// Backend that owns the synced collections.
#[async_trait]
pub trait QueryPort: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<String>, QueryError>;

    async fn query_collection(
        &self,
        collection: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, QueryError>;

    async fn global_search(
        &self,
        request: &GlobalSearchRequest,
    ) -> Result<GlobalSearchResponse, QueryError>;
}
