//! API layer - HTTP client and wire models for the `/query` service

pub mod client;
pub mod models;

pub use client::{DEFAULT_TIMEOUT_SECS, QUERY_ENDPOINT, QueryClient};
pub use models::{Pagination, QueryRequest, QueryResponse, Row};
