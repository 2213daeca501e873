//! Error types for the digest API client.
//!
//! # Design
//! The three classified kinds (`AuthExpired`, `AccessDenied`, `Request`)
//! carry an `ErrorPayload`, and their `Display` output is the JSON encoding
//! of that payload. Callers that only see the message string can decode it
//! back with `ErrorPayload::decode`. Callers holding the error branch on the
//! variant: 401 sends the user to login, 403 shows a permissions message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The `{status, error}` pair carried by every classified failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub status: u16,
    pub error: String,
}

impl ErrorPayload {
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    /// JSON encoding used as the error message.
    pub fn encode(&self) -> String {
        // Two plain fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"status":{},"error":"<unencodable>"}}"#, self.status)
        })
    }

    /// Decode a message produced by `encode`.
    pub fn decode(message: &str) -> Result<Self, ApiError> {
        serde_json::from_str(message).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the bearer token is missing, expired or invalid.
    #[error("{}", .0.encode())]
    AuthExpired(ErrorPayload),

    /// 403: authenticated, but not allowed to access the resource.
    #[error("{}", .0.encode())]
    AccessDenied(ErrorPayload),

    /// Any other status >= 400.
    #[error("{}", .0.encode())]
    Request(ErrorPayload),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// A create payload failed client-side validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// The classified payload, if this error came from an HTTP status.
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::AuthExpired(p) | ApiError::AccessDenied(p) | ApiError::Request(p) => Some(p),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.payload().map(|p| p.status)
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired(_))
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, ApiError::AccessDenied(_))
    }
}

/// One failing field of a create payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All failing fields of a create payload, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", summarize(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.fields.iter().find(|f| f.field == name)
    }
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}
