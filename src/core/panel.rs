//! Query panel state machine.
//!
//! All state the panel shows (input, last page, loading flag, error) lives in
//! [`PanelState`] and only changes through [`PanelState::apply`]:
//!
//! ```text
//! Idle ──Submit/LoadMore──▶ Loading ──RequestSucceeded──▶ Succeeded
//!                              │
//!                              └──────RequestFailed─────▶ Failed
//! ```
//!
//! Every started request gets a fresh [`RequestId`]. Starting a new request
//! supersedes the one in flight; completions for superseded ids are dropped,
//! so the most recently *issued* request is the one that gets displayed.
//!
//! Pages are never merged: a successful fetch replaces plan, results and
//! pagination wholesale.

use std::num::NonZeroU32;

use serde_json::Value;

use crate::api::models::{Pagination, QueryRequest, QueryResponse, Row};
use crate::error::FALLBACK_ERROR_MESSAGE;

pub const DEFAULT_LIMIT: NonZeroU32 = match NonZeroU32::new(5) {
    Some(limit) => limit,
    None => unreachable!(),
};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing has been fetched yet
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// What the user has typed plus the offset of the page currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInput {
    pub question: String,
    pub limit: NonZeroU32,
    pub offset: u64,
}

impl Default for QueryInput {
    fn default() -> Self {
        Self {
            question: String::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// A request the caller must send, tagged with the id its completion must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub request: QueryRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SetQuestion(String),
    SetLimit(NonZeroU32),
    /// New top-level query; always starts at offset 0
    Submit,
    /// Fetch the page at the current `next_offset`; no-op without one
    LoadMore,
    /// Start a request for the current question and limit at `offset`
    RequestStarted { offset: u64 },
    RequestSucceeded {
        id: RequestId,
        response: QueryResponse,
    },
    RequestFailed { id: RequestId, message: String },
    /// The caller gave up on a request without an outcome (e.g. its future was dropped)
    RequestAbandoned { id: RequestId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    id: RequestId,
    offset: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    input: QueryInput,
    plan: Option<Value>,
    results: Vec<Row>,
    pagination: Option<Pagination>,
    error: Option<String>,
    phase: Phase,
    last_request_id: RequestId,
    in_flight: Option<InFlight>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(question: impl Into<String>, limit: NonZeroU32) -> Self {
        Self {
            input: QueryInput {
                question: question.into(),
                limit,
                offset: 0,
            },
            ..Self::default()
        }
    }

    /// Apply one transition. Returns the request to send when the action starts one.
    pub fn apply(&mut self, action: PanelAction) -> Option<PendingRequest> {
        match action {
            PanelAction::SetQuestion(question) => {
                self.input.question = question;
                None
            }
            PanelAction::SetLimit(limit) => {
                self.input.limit = limit;
                None
            }
            PanelAction::Submit => Some(self.submit()),
            PanelAction::LoadMore => match self.next_offset() {
                Some(offset) => Some(self.start_request(offset)),
                None => {
                    log::debug!("load more ignored: no next_offset on the current page");
                    None
                }
            },
            PanelAction::RequestStarted { offset } => Some(self.start_request(offset)),
            PanelAction::RequestSucceeded { id, response } => {
                if let Some(in_flight) = self.take_current(id) {
                    self.plan = response.plan;
                    self.results = response.results;
                    self.pagination = response.pagination;
                    self.input.offset = in_flight.offset;
                    self.phase = Phase::Succeeded;
                }
                None
            }
            PanelAction::RequestFailed { id, message } => {
                if self.take_current(id).is_some() {
                    let message = if message.trim().is_empty() {
                        FALLBACK_ERROR_MESSAGE.to_string()
                    } else {
                        message
                    };
                    self.error = Some(message);
                    self.phase = Phase::Failed;
                }
                None
            }
            PanelAction::RequestAbandoned { id } => {
                if self.take_current(id).is_some() {
                    self.phase = Phase::Idle;
                }
                None
            }
        }
    }

    /// Start a new top-level query from offset 0. Same as applying `Submit`.
    pub fn submit(&mut self) -> PendingRequest {
        self.start_request(0)
    }

    fn start_request(&mut self, offset: u64) -> PendingRequest {
        self.last_request_id = self.last_request_id.wrapping_add(1);
        let id = self.last_request_id;

        if let Some(previous) = self.in_flight {
            log::debug!("request #{} superseded by #{}", previous.id, id);
        }

        self.error = None;
        self.phase = Phase::Loading;
        self.in_flight = Some(InFlight { id, offset });

        PendingRequest {
            id,
            request: QueryRequest {
                question: self.input.question.clone(),
                limit: self.input.limit.get(),
                offset,
            },
        }
    }

    /// Clears the in-flight slot if `id` is the latest request.
    fn take_current(&mut self, id: RequestId) -> Option<InFlight> {
        match self.in_flight {
            Some(in_flight) if in_flight.id == id => self.in_flight.take(),
            _ => {
                log::debug!("discarding stale completion for request #{}", id);
                None
            }
        }
    }

    pub fn input(&self) -> &QueryInput {
        &self.input
    }

    pub fn question(&self) -> &str {
        &self.input.question
    }

    pub fn limit(&self) -> NonZeroU32 {
        self.input.limit
    }

    /// Offset of the most recently completed successful fetch.
    pub fn offset(&self) -> u64 {
        self.input.offset
    }

    pub fn plan(&self) -> Option<&Value> {
        self.plan.as_ref()
    }

    pub fn results(&self) -> &[Row] {
        &self.results
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight_id(&self) -> Option<RequestId> {
        self.in_flight.map(|f| f.id)
    }

    pub fn next_offset(&self) -> Option<u64> {
        self.pagination.as_ref().and_then(|p| p.next_offset)
    }

    /// The page currently shown, in response shape.
    pub fn page(&self) -> QueryResponse {
        QueryResponse {
            plan: self.plan.clone(),
            results: self.results.clone(),
            pagination: self.pagination.clone(),
        }
    }

    /// Whether the "load more" affordance should be offered.
    pub fn can_load_more(&self) -> bool {
        self.next_offset().is_some()
    }
}
