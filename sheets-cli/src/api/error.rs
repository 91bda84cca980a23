//! Error kinds surfaced by the spreadsheet client

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single spreadsheet/drive operation.
///
/// Callers match on the kind to decide whether to skip, abort, or retry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify a non-success HTTP response.
    ///
    /// Google reports quota exhaustion as 403 with a `rateLimitExceeded` or
    /// `userRateLimitExceeded` reason, so the body is inspected before 403
    /// is treated as a permission problem.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = format!("{}: {}", status, error_message(body));
        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::UNAUTHORIZED => ApiError::Auth(message),
            StatusCode::FORBIDDEN if is_rate_limit_body(body) => ApiError::Transient(message),
            StatusCode::FORBIDDEN => ApiError::PermissionDenied(message),
            StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
                ApiError::Transient(message)
            }
            s if s.is_server_error() => ApiError::Transient(message),
            _ => ApiError::InvalidRequest(message),
        }
    }

    /// Whether repeating the same call later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Short label used in run reports
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not-found",
            ApiError::PermissionDenied(_) => "permission-denied",
            ApiError::Transient(_) => "transient",
            ApiError::InvalidRequest(_) => "invalid-request",
            ApiError::Auth(_) => "auth",
            ApiError::InvalidResponse(_) => "invalid-response",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status, "")
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            // connect, timeout, body and redirect failures
            ApiError::Transient(err.to_string())
        }
    }
}

/// Pull `error.message` out of a Google error payload, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn is_rate_limit_body(body: &str) -> bool {
    body.contains("rateLimitExceeded") || body.contains("userRateLimitExceeded")
}
