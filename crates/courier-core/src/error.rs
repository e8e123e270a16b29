//! Unified error types for courier.
//!
//! Outbound calls fail through a single channel, [`ApiError`], whose variants
//! keep the three failure origins apart:
//!
//! | Variant | Origin | Sent over the wire? |
//! |---------|--------|---------------------|
//! | [`ApiError::Encoding`] | the request body could not be built | no |
//! | [`ApiError::Transport`] | the call could not complete, or the reply was not an envelope | maybe |
//! | [`ApiError::Remote`] | the service answered `ok = false` | yes |
//!
//! Inbound payloads that cannot be decoded produce a [`DecodeError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::response::ResponseParameters;

// =============================================================================
// Encoding Errors
// =============================================================================

/// Errors raised while building a request body.
///
/// These never reach the network: the whole request is abandoned.
#[derive(Debug, Clone, Error)]
pub enum EncodingError {
    /// A local file could not be opened or read.
    #[error("failed to read file '{}': {reason}", path.display())]
    FileRead {
        /// Path that was being read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// A nested value could not be encoded as JSON.
    #[error("failed to encode field '{field}' as JSON: {reason}")]
    Json {
        /// Wire name of the field.
        field: String,
        /// Reason for failure.
        reason: String,
    },

    /// A field carries an upload but a JSON body was requested.
    #[error("field '{field}' uploads a file and cannot be sent in a JSON body")]
    UploadInJson {
        /// Wire name of the field.
        field: String,
    },

    /// A reference attachment targets a field that already uploads a file.
    #[error("attachment '{field}' is a reference but the field already uploads a file")]
    AttachmentConflict {
        /// Wire name of the field.
        field: String,
    },

    /// The request could not be serialized as a whole.
    #[error("failed to serialize request: {0}")]
    Body(String),
}

impl EncodingError {
    /// Creates a JSON sub-encoding error for the given field.
    pub fn json(field: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::Json {
            field: field.into(),
            reason: err.to_string(),
        }
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised before a response envelope could be parsed.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The HTTP request could not be sent or completed.
    #[error("request to '{endpoint}' failed: {reason}")]
    Request {
        /// Endpoint (method name or file path) being called.
        endpoint: String,
        /// Reason for failure.
        reason: String,
    },

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The response body is not a response envelope.
    #[error("invalid response (HTTP {status}): {reason}")]
    InvalidResponse {
        /// HTTP status code of the response.
        status: u16,
        /// Reason for failure.
        reason: String,
    },

    /// A non-envelope endpoint answered with an error status.
    #[error("HTTP {status} error: {reason}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// Response text, if any.
        reason: String,
    },

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Remote Errors
// =============================================================================

/// A well-formed `ok = false` response from the service.
///
/// The core never retries these; [`retry_after`](Self::retry_after) and
/// [`migrate_to_chat_id`](Self::migrate_to_chat_id) are hints for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote API error ({error_code}): {description}")]
pub struct RemoteError {
    /// Error code reported by the service.
    pub error_code: i64,
    /// Human-readable description reported by the service.
    pub description: String,
    /// Optional hints attached to the error.
    pub parameters: Option<ResponseParameters>,
}

impl RemoteError {
    /// Seconds the caller should wait before repeating the request.
    pub fn retry_after(&self) -> Option<u64> {
        self.parameters.as_ref().and_then(|p| p.retry_after)
    }

    /// The supergroup the chat was migrated to.
    pub fn migrate_to_chat_id(&self) -> Option<i64> {
        self.parameters.as_ref().and_then(|p| p.migrate_to_chat_id)
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for outbound API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request body could not be built.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The call could not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service rejected the call.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The result did not match the expected type.
    #[error("failed to decode result of '{method}': {reason}")]
    Decode {
        /// Method whose result was being decoded.
        method: String,
        /// Reason for failure.
        reason: String,
    },
}

impl ApiError {
    /// Returns `true` if the service answered and rejected the call.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Returns `true` if the call could not complete.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns the remote error, if this is one.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}

// =============================================================================
// Decode Errors
// =============================================================================

/// An inbound update payload could not be decoded.
#[derive(Debug, Clone, Error)]
#[error("failed to decode update: {reason}")]
pub struct DecodeError {
    /// Reason for failure.
    pub reason: String,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for request encoding.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_exposes_hints() {
        let err = RemoteError {
            error_code: 429,
            description: "Too Many Requests: retry after 7".into(),
            parameters: Some(ResponseParameters {
                migrate_to_chat_id: None,
                retry_after: Some(7),
            }),
        };
        assert_eq!(err.retry_after(), Some(7));
        assert_eq!(err.migrate_to_chat_id(), None);

        let api: ApiError = err.into();
        assert!(api.is_remote());
        assert!(!api.is_transport());
        assert_eq!(api.as_remote().map(|r| r.error_code), Some(429));
    }

    #[test]
    fn transport_and_remote_are_distinguishable() {
        let api: ApiError = TransportError::Body("connection reset".into()).into();
        assert!(api.is_transport());
        assert!(api.as_remote().is_none());
    }
}
