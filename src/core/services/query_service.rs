use super::traits::QueryBackend;
use crate::core::panel::{PanelAction, PanelState, PendingRequest, RequestId};
use crate::error::ApiError;

/// How a fetch the service ran ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Failed,
}

/// Drives a [`PanelState`] through the fetch protocol against a backend.
pub struct QueryService<B> {
    backend: B,
    panel: PanelState,
    last_error: Option<ApiError>,
}

/// Settles the in-flight request on every exit path.
///
/// If the fetch future is dropped before the backend answers, the request is
/// abandoned so the panel never stays stuck in `Loading`.
struct InFlightGuard<'a> {
    panel: &'a mut PanelState,
    id: RequestId,
    settled: bool,
}

impl InFlightGuard<'_> {
    fn settle(mut self, action: PanelAction) {
        self.settled = true;
        self.panel.apply(action);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::warn!("request #{} dropped before completion", self.id);
            self.panel
                .apply(PanelAction::RequestAbandoned { id: self.id });
        }
    }
}

impl<B: QueryBackend> QueryService<B> {
    pub fn new(backend: B, panel: PanelState) -> Self {
        Self {
            backend,
            panel,
            last_error: None,
        }
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Error behind the most recent failed fetch; the panel only keeps its message.
    pub fn take_last_error(&mut self) -> Option<ApiError> {
        self.last_error.take()
    }

    /// Set the question and run a new top-level query from offset 0.
    pub async fn submit(&mut self, question: impl Into<String>) -> FetchOutcome {
        self.panel.apply(PanelAction::SetQuestion(question.into()));
        let pending = self.panel.submit();
        self.execute(pending).await
    }

    /// Fetch the next page. `None` when the current page has no `next_offset`.
    pub async fn load_more(&mut self) -> Option<FetchOutcome> {
        let pending = self.panel.apply(PanelAction::LoadMore)?;
        Some(self.execute(pending).await)
    }

    /// Apply an arbitrary action, running the request it starts, if any.
    pub async fn dispatch(&mut self, action: PanelAction) -> Option<FetchOutcome> {
        let pending = self.panel.apply(action)?;
        Some(self.execute(pending).await)
    }

    async fn execute(&mut self, pending: PendingRequest) -> FetchOutcome {
        let Self {
            backend,
            panel,
            last_error,
        } = self;
        *last_error = None;
        let guard = InFlightGuard {
            panel,
            id: pending.id,
            settled: false,
        };

        log::debug!(
            "request #{} started (offset {})",
            pending.id,
            pending.request.offset
        );

        match backend.query(&pending.request).await {
            Ok(response) => {
                log::debug!(
                    "request #{} returned {} rows",
                    pending.id,
                    response.results.len()
                );
                guard.settle(PanelAction::RequestSucceeded {
                    id: pending.id,
                    response,
                });
                FetchOutcome::Loaded
            }
            Err(e) => {
                log::debug!("request #{} failed: {}", pending.id, e);
                guard.settle(PanelAction::RequestFailed {
                    id: pending.id,
                    message: e.user_message(),
                });
                *last_error = Some(e);
                FetchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{QueryRequest, QueryResponse};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::num::NonZeroU32;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<QueryResponse, ApiError>>>,
        seen: Mutex<Vec<QueryRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<QueryResponse, ApiError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<QueryRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryBackend for ScriptedBackend {
        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    struct NeverBackend;

    #[async_trait]
    impl QueryBackend for NeverBackend {
        async fn query(&self, _request: &QueryRequest) -> Result<QueryResponse, ApiError> {
            std::future::pending().await
        }
    }

    fn page(value: serde_json::Value) -> Result<QueryResponse, ApiError> {
        Ok(serde_json::from_value(value).unwrap())
    }

    fn panel(limit: u32) -> PanelState {
        PanelState::with_input("", NonZeroU32::new(limit).unwrap())
    }

    #[tokio::test]
    async fn test_submit_then_load_more() {
        let backend = ScriptedBackend::new(vec![
            page(json!({
                "plan": {"op": "list"},
                "results": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}],
                "pagination": {"next_offset": 2}
            })),
            page(json!({"results": [{"id": 3, "name": "C"}]})),
        ]);
        let mut service = QueryService::new(backend, panel(2));

        assert_eq!(
            service.submit("list customers").await,
            FetchOutcome::Loaded
        );
        assert_eq!(service.panel().results().len(), 2);
        assert!(service.panel().can_load_more());

        assert_eq!(service.load_more().await, Some(FetchOutcome::Loaded));
        assert_eq!(service.panel().results().len(), 1);
        assert_eq!(service.panel().offset(), 2);
        assert_eq!(service.load_more().await, None);

        let seen = service.backend().seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].offset, 0);
        assert_eq!(seen[1].offset, 2);
        assert_eq!(seen[1].question, "list customers");
        assert_eq!(seen[1].limit, 2);
    }

    #[tokio::test]
    async fn test_resubmit_after_paging_restarts_at_zero() {
        let backend = ScriptedBackend::new(vec![
            page(json!({"results": [{"id": 1}], "pagination": {"next_offset": 1}})),
            page(json!({"results": [{"id": 2}], "pagination": {"next_offset": 2}})),
            page(json!({"results": [{"id": 9}]})),
        ]);
        let mut service = QueryService::new(backend, panel(1));

        service.submit("list").await;
        service.load_more().await;
        assert_eq!(service.submit("list again").await, FetchOutcome::Loaded);
        assert_eq!(service.panel().offset(), 0);

        let offsets: Vec<u64> = service.backend().seen().iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 1, 0]);
    }

    #[tokio::test]
    async fn test_last_error_keeps_failure_kind() {
        let backend = ScriptedBackend::new(vec![
            Err(ApiError::Transport {
                endpoint: "/query".to_string(),
                message: "connection refused".to_string(),
            }),
            page(json!({"results": []})),
        ]);
        let mut service = QueryService::new(backend, panel(2));

        assert_eq!(service.submit("list").await, FetchOutcome::Failed);
        let err = service.take_last_error().unwrap();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(service.panel().error(), Some(err.user_message().as_str()));
        assert!(service.take_last_error().is_none());

        service.submit("list").await;
        assert!(service.take_last_error().is_none());
    }

    #[tokio::test]
    async fn test_failure_surfaces_detail_and_keeps_rows() {
        let backend = ScriptedBackend::new(vec![
            page(json!({"results": [{"id": 1}], "pagination": {"next_offset": 1}})),
            Err(ApiError::Http {
                status: 400,
                endpoint: "/query".to_string(),
                message: "limit must be positive".to_string(),
            }),
        ]);
        let mut service = QueryService::new(backend, panel(1));

        service.submit("q").await;
        assert_eq!(service.submit("q").await, FetchOutcome::Failed);
        assert_eq!(service.panel().error(), Some("limit must be positive"));
        assert_eq!(service.panel().results().len(), 1);
        assert!(!service.panel().is_loading());
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let backend = ScriptedBackend::new(vec![Err(ApiError::Transport {
            endpoint: "/query".to_string(),
            message: "connection refused".to_string(),
        })]);
        let mut service = QueryService::new(backend, panel(1));

        assert_eq!(service.submit("q").await, FetchOutcome::Failed);
        let error = service.panel().error().unwrap();
        assert!(error.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_dropped_fetch_clears_loading() {
        let mut service = QueryService::new(NeverBackend, panel(1));

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), service.submit("slow")).await;
        assert!(timed_out.is_err());

        assert!(!service.panel().is_loading());
        assert!(service.panel().error().is_none());
        assert_eq!(service.panel().question(), "slow");
    }

    #[tokio::test]
    async fn test_dispatch_non_request_action() {
        let backend = ScriptedBackend::new(vec![]);
        let mut service = QueryService::new(backend, panel(1));
        let outcome = service
            .dispatch(PanelAction::SetQuestion("x".to_string()))
            .await;
        assert!(outcome.is_none());
        assert_eq!(service.panel().question(), "x");
        assert!(service.backend().seen().is_empty());
    }
}
