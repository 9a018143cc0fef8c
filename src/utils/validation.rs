//! Input validation for configuration values and query parameters

use crate::error::CliError;
use std::num::NonZeroU32;

/// Validate that a URL is an absolute http(s) origin
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

/// Page size must be positive
pub fn validate_limit(limit: u32) -> crate::Result<NonZeroU32> {
    NonZeroU32::new(limit).ok_or_else(|| {
        CliError::InvalidArguments("limit must be a positive integer".to_string()).into()
    })
}

pub fn validate_timeout(timeout_secs: u64) -> crate::Result<u64> {
    if timeout_secs == 0 {
        return Err(
            CliError::InvalidArguments("timeout_seconds must be at least 1".to_string()).into(),
        );
    }
    Ok(timeout_secs)
}
