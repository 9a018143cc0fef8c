use crate::api::client::QueryClient;
use crate::api::models::{QueryRequest, QueryResponse};
use crate::error::ApiError;
use async_trait::async_trait;

/// Anything that can answer a `/query` request.
///
/// [`QueryClient`] is the HTTP implementation; tests plug in scripted fakes.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError>;
}

#[async_trait]
impl QueryBackend for QueryClient {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        self.post_query(request).await
    }
}

#[async_trait]
impl<T: QueryBackend + ?Sized> QueryBackend for std::sync::Arc<T> {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        (**self).query(request).await
    }
}
