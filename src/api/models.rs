use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One record of a result page. Keys keep the order they had in the response body.
pub type Row = Map<String, Value>;

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Request body for POST /query
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub question: String,
    pub limit: u32,
    pub offset: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct QueryResponse {
    /// Opaque description of how the service interpreted the question.
    #[serde(default)]
    pub plan: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Row>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl QueryResponse {
    /// Cursor for the next page, if the service reported one.
    pub fn next_offset(&self) -> Option<u64> {
        self.pagination.as_ref().and_then(|p| p.next_offset)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default)]
    pub next_offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// Reads the `detail` string out of an error body.
///
/// Returns `None` when the body is not JSON, has no `detail`, or `detail`
/// is not a non-empty string.
pub fn extract_error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}
