use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::entities::integration::{ApiAck, AuthUrl, IntegrationStatus, ResyncAck};
use crate::domain::entities::query::{
    CollectionList, GlobalSearchRequest, GlobalSearchResponse, QueryError, QueryRequest,
    QueryResponse,
};
use crate::usecase::ports::integration::IntegrationPort;
use crate::usecase::ports::query::QueryPort;

/// JSON client for the sync service's `data` and `github` endpoints.
#[derive(Clone)]
pub struct SyncApiClient {
    client: Client,
    base_url: String,
}

/// Joins without doubling or dropping the separating slash.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

impl SyncApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        join_url(&self.base_url, endpoint)
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, QueryError> {
        let url = self.url(endpoint);
        Url::parse(&url).map_err(|err| QueryError::InvalidRequest(format!("{url}: {err}")))
    }

    /// `endpoint` followed by one percent-encoded path segment, so ids and
    /// collection names containing `/` or spaces stay a single segment.
    pub fn segment_url(&self, endpoint: &str, segment: &str) -> Result<Url, QueryError> {
        let mut url = self.endpoint_url(endpoint)?;
        url.path_segments_mut()
            .map_err(|_| QueryError::InvalidRequest(format!("{endpoint} cannot take path segments")))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, QueryError> {
        let response = request
            .send()
            .await
            .map_err(|err| QueryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(QueryError::Status {
                code: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| QueryError::Decode(err.to_string()))
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T, QueryError> {
        tracing::debug!(%method, %url, "sync api request");
        self.send(self.client.request(method, url)).await
    }

    async fn call_with_body<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, QueryError> {
        tracing::debug!(%method, %url, "sync api request");
        self.send(self.client.request(method, url).json(body)).await
    }
}

#[async_trait]
impl QueryPort for SyncApiClient {
    async fn list_collections(&self) -> Result<Vec<String>, QueryError> {
        let list: CollectionList = self.call(Method::GET, self.endpoint_url("data/collections")?).await?;
        Ok(list.collections)
    }

    async fn query_collection(
        &self,
        collection: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, QueryError> {
        let url = self.segment_url("data/query", collection)?;
        self.call_with_body(Method::POST, url, request).await
    }

    async fn global_search(
        &self,
        request: &GlobalSearchRequest,
    ) -> Result<GlobalSearchResponse, QueryError> {
        self.call_with_body(Method::POST, self.endpoint_url("data/search")?, request)
            .await
    }
}

#[async_trait]
impl IntegrationPort for SyncApiClient {
    async fn auth_url(&self) -> Result<AuthUrl, QueryError> {
        self.call(Method::GET, self.endpoint_url("github/auth-url")?)
            .await
    }

    async fn status(&self, user_id: &str) -> Result<IntegrationStatus, QueryError> {
        let url = self.segment_url("github/status", user_id)?;
        self.call(Method::GET, url).await
    }

    async fn remove(&self, user_id: &str) -> Result<ApiAck, QueryError> {
        let url = self.segment_url("github/integration", user_id)?;
        self.call(Method::DELETE, url).await
    }

    async fn resync(&self, user_id: &str) -> Result<ResyncAck, QueryError> {
        let url = self.segment_url("github/resync", user_id)?;
        self.call_with_body(Method::POST, url, &serde_json::json!({}))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_never_doubles_slashes() {
        assert_eq!(
            join_url("http://localhost:3000/api/", "/data/collections"),
            "http://localhost:3000/api/data/collections"
        );
        assert_eq!(
            join_url("http://localhost:3000/api", "data/search"),
            "http://localhost:3000/api/data/search"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let client = SyncApiClient::new("http://localhost:3000/api/");

        let plain = client
            .segment_url("data/query", "pull_requests")
            .expect("url should build");
        assert_eq!(plain.as_str(), "http://localhost:3000/api/data/query/pull_requests");

        let awkward = client
            .segment_url("github/status", "a b/c")
            .expect("url should build");
        assert_eq!(awkward.as_str(), "http://localhost:3000/api/github/status/a%20b%2Fc");
    }

    #[test]
    fn unparseable_base_url_is_an_invalid_request() {
        let client = SyncApiClient::new("not a url");

        assert!(matches!(
            client.segment_url("data/query", "issues"),
            Err(QueryError::InvalidRequest(_))
        ));
    }
}
