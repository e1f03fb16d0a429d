//! The `{success, data, message}` response wrapper.

use crate::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard response wrapper used by almost every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: None,
        }
    }

    /// A failed envelope carrying `message`.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            code: None,
        }
    }
}

/// Whether a body looks like an envelope: an object with a boolean `success`.
pub fn is_envelope(body: &Value) -> bool {
    matches!(body.get("success"), Some(Value::Bool(_)))
}

/// Unwrap a response body into its payload.
///
/// Envelopes resolve to `data` (`null` when absent) or fail with a
/// [`Business`](crate::ErrorKind::Business) error built from `message`.
/// Bodies that are not envelopes (a few endpoints return bare arrays) pass
/// through unchanged so the caller can decode them.
pub fn open(body: Value) -> Result<Value, ApiError> {
    if !is_envelope(&body) {
        return Ok(body);
    }

    let envelope: Envelope<Value> = serde_json::from_value(body)?;
    if envelope.success {
        Ok(envelope.data.unwrap_or(Value::Null))
    } else {
        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Request failed".to_string());
        Err(ApiError::business(message, envelope.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_success_yields_data() {
        let body = json!({"success": true, "data": {"id": 1}, "message": "ok"});
        assert_eq!(open(body).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn test_success_without_data_is_null() {
        let body = json!({"success": true, "message": "toggled"});
        assert_eq!(open(body).unwrap(), Value::Null);
    }

    #[test]
    fn test_failure_is_business_error() {
        let body = json!({"success": false, "message": "out of stock", "code": "STOCK"});
        let err = open(body).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Business);
        assert_eq!(err.message, "out of stock");
        assert_eq!(err.code, "STOCK");
    }

    #[test]
    fn test_failure_without_message_has_fallback() {
        let err = open(json!({"success": false})).unwrap_err();
        assert_eq!(err.message, "Request failed");
    }

    #[test]
    fn test_bare_array_passes_through() {
        let body = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(open(body.clone()).unwrap(), body);
    }

    #[test]
    fn test_non_bool_success_is_not_envelope() {
        let body = json!({"success": "yes", "data": 1});
        assert!(!is_envelope(&body));
    }
}
