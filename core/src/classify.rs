//! Maps an `HttpResponse` to a success value or a classified `ApiError`.
//!
//! - 204: `{"message": <status text>}`, body is never parsed.
//! - below 400: the parsed JSON body, verbatim.
//! - 401 / 403 / other >= 400: `AuthExpired` / `AccessDenied` / `Request`,
//!   each carrying `detail`, else `detail[0].msg`, else a fallback text.

use serde_json::{json, Value};

use crate::error::{ApiError, ErrorPayload};
use crate::http::HttpResponse;

pub const AUTH_EXPIRED_FALLBACK: &str = "Token expired or invalid";
pub const ACCESS_DENIED_FALLBACK: &str = "Access denied";

/// Classify a response into its success value or error kind.
pub fn classify_response(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.status == 204 {
        return Ok(json!({ "message": response.status_text }));
    }

    if response.status < 400 {
        return serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()));
    }

    // Error bodies that are not JSON still get classified; they just fall
    // through to the fallback text.
    let body: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);

    match response.status {
        401 => Err(ApiError::AuthExpired(ErrorPayload::new(
            401,
            error_message(&body).unwrap_or(AUTH_EXPIRED_FALLBACK),
        ))),
        403 => Err(ApiError::AccessDenied(ErrorPayload::new(
            403,
            error_message(&body).unwrap_or(ACCESS_DENIED_FALLBACK),
        ))),
        status => Err(ApiError::Request(ErrorPayload::new(
            status,
            error_message(&body).unwrap_or(response.status_text.as_str()),
        ))),
    }
}

/// `detail` when it is a non-empty string, else `detail[0].msg`.
fn error_message(body: &Value) -> Option<&str> {
    match body.get("detail")? {
        Value::String(detail) if !detail.is_empty() => Some(detail),
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .filter(|msg| !msg.is_empty()),
        _ => None,
    }
}
