//! The response envelope every API method answers with.

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Hints attached to a failed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseParameters {
    /// The group has been migrated to a supergroup with this identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrate_to_chat_id: Option<i64>,
    /// Seconds left to wait before the request can be repeated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// A generic API response.
///
/// `ok = false` means `description` and `error_code` are authoritative and
/// `result` is absent; `ok = true` means `result` carries the method's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub ok: bool,
    /// The method's result (if successful).
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Human-readable error description (if failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Error code (if failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    /// Additional error hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ResponseParameters>,
}

impl<T> ApiResponse<T> {
    /// Checks if the API call was successful.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Converts the response into a Result.
    ///
    /// A successful response without a result yields `Ok(None)`.
    pub fn into_result(self) -> Result<Option<T>, RemoteError> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(RemoteError {
                error_code: self.error_code.unwrap_or_default(),
                description: self
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
                parameters: self.parameters,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn failed_envelope_becomes_remote_error() {
        let raw = r#"{"ok":false,"description":"bad request","error_code":400}"#;
        let response: ApiResponse<Value> = serde_json::from_str(raw).unwrap();

        let err = response.into_result().unwrap_err();
        assert_eq!(err.error_code, 400);
        assert_eq!(err.description, "bad request");
        assert!(err.parameters.is_none());
    }

    #[test]
    fn failed_envelope_carries_retry_hint() {
        let raw = r#"{"ok":false,"description":"Too Many Requests","error_code":429,
                      "parameters":{"retry_after":12}}"#;
        let response: ApiResponse<Value> = serde_json::from_str(raw).unwrap();

        let err = response.into_result().unwrap_err();
        assert_eq!(err.retry_after(), Some(12));
    }

    #[test]
    fn boolean_result_is_kept() {
        let response: ApiResponse<bool> = serde_json::from_str(r#"{"ok":true,"result":true}"#).unwrap();
        assert_eq!(response.into_result().unwrap(), Some(true));
    }

    #[test]
    fn missing_result_on_success_is_none() {
        let response: ApiResponse<Value> = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.into_result().unwrap(), None);
    }
}
