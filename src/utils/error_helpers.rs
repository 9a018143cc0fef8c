use crate::error::{ApiError, DisplayError, FALLBACK_ERROR_MESSAGE};
use reqwest::StatusCode;
use std::io;

/// Helper functions for standardizing error conversions across the codebase
/// Convert reqwest send errors to ApiError with endpoint context
pub fn convert_request_error(error: reqwest::Error, endpoint: &str, timeout_secs: u64) -> ApiError {
    if error.is_timeout() {
        return convert_timeout_error(endpoint, timeout_secs);
    }

    ApiError::Transport {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

/// Convert timeout errors to ApiError with endpoint context
pub fn convert_timeout_error(endpoint: &str, timeout_secs: u64) -> ApiError {
    ApiError::Timeout {
        timeout_secs,
        endpoint: endpoint.to_string(),
    }
}

/// Convert JSON deserialization errors to ApiError with endpoint context
pub fn convert_json_error(error: impl std::fmt::Display, endpoint: &str) -> ApiError {
    ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: format!("JSON parse error: {}", error),
    }
}

/// Build the error for a non-success status.
///
/// `detail` wins when present; otherwise the status line ("404 Not Found").
pub fn convert_status_error(status: StatusCode, endpoint: &str, detail: Option<String>) -> ApiError {
    ApiError::Http {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
        message: detail.unwrap_or_else(|| status_line(status)),
    }
}

pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => format!("{} {}", status.as_u16(), FALLBACK_ERROR_MESSAGE),
    }
}

/// Convert IO errors to DisplayError for terminal operations
pub fn convert_io_to_display_error(error: io::Error, operation: &str) -> DisplayError {
    DisplayError::TerminalOutput(format!("{}: {}", operation, error))
}

/// Helper macro for display errors
#[macro_export]
macro_rules! map_display_error {
    ($result:expr, $operation:expr) => {
        $result
            .map_err(|e| $crate::utils::error_helpers::convert_io_to_display_error(e, $operation))
    };
}
