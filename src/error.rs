//! Error types for the swish library

use crate::types::ApiError;
use thiserror::Error;

/// Result type alias for swish operations
pub type Result<T> = std::result::Result<T, SwishError>;

/// Main error type for swish operations
#[derive(Error, Debug)]
pub enum SwishError {
    /// Certificate, CA or other client configuration is unusable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The gateway rejected the request body (HTTP 422)
    #[error("{}", format_api_errors(.errors))]
    Validation { errors: Vec<ApiError> },

    /// The payee alias does not belong to the merchant certificate (HTTP 403)
    #[error("{}", format_api_errors(.errors))]
    AliasMismatch { errors: Vec<ApiError> },

    /// The status location does not resolve to an instruction (HTTP 404)
    #[error("{}", format_api_errors(.errors))]
    NotFound { errors: Vec<ApiError> },

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Timeout error
    #[error("Request timeout")]
    Timeout,

    /// The caller cancelled the request before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Status code the gateway is not documented to return for this operation
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A successful response lacked a header carrying the result
    #[error("Missing response header: {name}")]
    MissingHeader { name: String },

    /// Amount string is not a decimal number
    #[error("Invalid amount: {value}")]
    InvalidAmount { value: String },

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base64 encoding/decoding error
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwishError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an unexpected status error
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a missing header error
    pub fn missing_header(name: impl Into<String>) -> Self {
        Self::MissingHeader { name: name.into() }
    }

    /// Error entries reported by the gateway, empty for local failures
    pub fn api_errors(&self) -> &[ApiError] {
        match self {
            Self::Validation { errors }
            | Self::AliasMismatch { errors }
            | Self::NotFound { errors } => errors,
            _ => &[],
        }
    }

    /// Code of the first gateway error entry, if any
    pub fn code(&self) -> Option<&str> {
        self.api_errors().first().map(|e| e.error_code.as_str())
    }

    /// Whether repeating the same call could succeed.
    ///
    /// Advisory only: the client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Join gateway error entries as `[CODE] message | [CODE] message`
pub fn format_api_errors(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.error_code, e.error_message))
        .collect::<Vec<_>>()
        .join(" | ")
}
