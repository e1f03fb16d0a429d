//! Normalized API error.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// Broad classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The server could not be reached.
    Network,
    /// The global request timeout elapsed.
    Timeout,
    /// HTTP 401. The session has already been cleared when this is returned.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 5xx.
    Server,
    /// Any other non-2xx status.
    Request,
    /// The envelope came back with `success: false`.
    Business,
    /// The body did not have the expected shape.
    Malformed,
}

impl ErrorKind {
    /// Default machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Server => "SERVER_ERROR",
            ErrorKind::Request => "REQUEST_ERROR",
            ErrorKind::Business => "BUSINESS_ERROR",
            ErrorKind::Malformed => "MALFORMED_RESPONSE",
        }
    }

    /// Classify an HTTP status code. Returns `None` for 2xx.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            401 => Some(ErrorKind::Unauthorized),
            403 => Some(ErrorKind::Forbidden),
            404 => Some(ErrorKind::NotFound),
            500..=u16::MAX => Some(ErrorKind::Server),
            _ => Some(ErrorKind::Request),
        }
    }
}

/// Error returned by every API call.
///
/// Carries `{code, message, details, timestamp}` plus the HTTP status when
/// one was received.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
    pub status: Option<u16>,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    /// Create an error of the given kind with the kind's default code.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code().to_string(),
            message: message.into(),
            details: None,
            status: None,
            timestamp: Utc::now(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, message)
    }

    /// A `success: false` envelope.
    pub fn business(message: impl Into<String>, code: Option<String>) -> Self {
        let mut err = Self::new(ErrorKind::Business, message);
        if let Some(code) = code {
            err.code = code;
        }
        err
    }

    /// Build an error from a non-2xx response.
    ///
    /// `message` and `code` are taken from the body when it is a JSON object
    /// carrying them; the whole body is kept in `details`.
    pub fn from_status(status: u16, body: Option<Value>) -> Self {
        let kind = ErrorKind::from_status(status).unwrap_or(ErrorKind::Request);

        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));

        let mut err = Self::new(kind, message);
        if kind == ErrorKind::Request {
            if let Some(code) = body
                .as_ref()
                .and_then(|b| b.get("code"))
                .and_then(Value::as_str)
            {
                err.code = code.to_string();
            }
        }
        err.status = Some(status);
        err.details = body;
        err
    }

    /// Attach extra diagnostic details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// True for HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    /// True when the failure happened before a response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Network | ErrorKind::Timeout)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::malformed(e.to_string())
    }
}
