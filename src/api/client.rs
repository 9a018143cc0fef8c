use crate::api::models::{QueryRequest, QueryResponse, extract_error_detail};
use crate::error::ApiError;
use crate::utils::error_helpers::{
    convert_json_error, convert_request_error, convert_status_error,
};
use reqwest::{Client, Method, RequestBuilder};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const QUERY_ENDPOINT: &str = "/query";
const USER_AGENT: &str = concat!("oda-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct QueryClient {
    client: Client,
    pub base_url: String,
    timeout_secs: u64,
}

impl QueryClient {
    // Create client with the default timeout
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: String, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| convert_request_error(e, "client_init", timeout_secs))?;

        Ok(QueryClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// POST the request to `{base_url}/query` and decode the page.
    ///
    /// Non-success statuses become [`ApiError::Http`] carrying the body's
    /// `detail` string, or the status line when there is none.
    pub async fn post_query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        let endpoint = QUERY_ENDPOINT;

        log::debug!(
            "POST {}{} question={:?} limit={} offset={}",
            self.base_url,
            endpoint,
            request.question,
            request.limit,
            request.offset
        );

        let response = self
            .build_request(Method::POST, endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, self.timeout_secs))?;

        let status = response.status();
        log::debug!("{} responded with {}", endpoint, status);

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| convert_request_error(e, endpoint, self.timeout_secs))?;
            serde_json::from_str::<QueryResponse>(&body).map_err(|e| convert_json_error(e, endpoint))
        } else {
            // An unreadable body is treated like one without a detail field
            let body = response.text().await.unwrap_or_default();
            Err(convert_status_error(
                status,
                endpoint,
                extract_error_detail(&body),
            ))
        }
    }
}
