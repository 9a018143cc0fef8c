use thiserror::Error;

/// Message used when a failed response carries neither a `detail` field nor a status reason.
pub const FALLBACK_ERROR_MESSAGE: &str = "Request failed";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Input error: {0}")]
    Input(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Transport error: {message}")]
    Transport { endpoint: String, message: String },
    #[error("Failed to decode response: {message}")]
    Decode { endpoint: String, message: String },
}

impl ApiError {
    /// The single string shown to the user for this failure.
    ///
    /// For HTTP errors the message is already the server's `detail` (or the
    /// status line when the body had none), so it is passed through verbatim.
    pub fn user_message(&self) -> String {
        let message = match self {
            ApiError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration save failed: {message}")]
    ConfigSaveFailed { message: String },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Table formatting failed: {0}")]
    TableFormat(String),
    #[error("Terminal output error: {0}")]
    TerminalOutput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown configuration key '{key}'")]
    UnknownKey { key: String },
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(api_error) => match api_error {
                ApiError::Transport { .. } => ErrorSeverity::High,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
        }
    }

    /// Short message without the layer prefix, used by the CLI.
    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Api(api_error) => api_error.user_message(),
            AppError::Cli(CliError::InvalidArguments(message) | CliError::QueryFailed(message)) => {
                message.clone()
            }
            _ => format!("{}", self),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Api(ApiError::Transport { .. }) => Some(
                "Check that the query service is running and --api-url / ODA_API_URL points at it"
                    .to_string(),
            ),
            AppError::Api(ApiError::Timeout { .. }) => Some(
                "Raise timeout_seconds with 'oda-cli config set timeout_seconds <secs>'"
                    .to_string(),
            ),
            AppError::Config(ConfigError::UnknownKey { .. }) => Some(
                "Known keys: api_url, default_limit, timeout_seconds".to_string(),
            ),
            _ => None,
        }
    }
}
