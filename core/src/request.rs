//! Request builder: caller options merged with default headers and the
//! optional bearer token.
//!
//! # Design
//! Defaults go in first (`Content-Type`, `Accept`, then `Authorization`
//! when a token is present). Caller headers are merged on top; a caller
//! header replaces a default with the same name, compared without regard to
//! case, and keeps the default's position so header order is stable.

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

const JSON: &str = "application/json";

/// Caller-supplied options for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn delete() -> Self {
        Self::new(HttpMethod::Delete)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `payload` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }
}

/// Join `endpoint` onto `base_url`.
///
/// Absolute `http://` / `https://` endpoints are used untouched.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

/// Build the outgoing request.
///
/// An empty token is treated as no token.
pub fn build_request(
    base_url: &str,
    endpoint: &str,
    token: Option<&str>,
    options: RequestOptions,
) -> HttpRequest {
    let mut headers = vec![
        ("Content-Type".to_string(), JSON.to_string()),
        ("Accept".to_string(), JSON.to_string()),
    ];
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.push(("Authorization".to_string(), format!("Bearer {token}")));
    }

    for (name, value) in options.headers {
        match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
            Some(existing) => existing.1 = value,
            None => headers.push((name, value)),
        }
    }

    HttpRequest {
        method: options.method,
        url: join_url(base_url, endpoint),
        headers,
        body: options.body,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_token() {
        let req = build_request("http://localhost:8000/api", "/projects", None, RequestOptions::get());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8000/api/projects");
        assert_eq!(
            req.headers,
            pairs(&[("Content-Type", JSON), ("Accept", JSON)])
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn token_adds_bearer_header() {
        let req = build_request("http://x", "projects", Some("abc"), RequestOptions::get());
        assert_eq!(req.header("authorization"), Some("Bearer abc"));
        assert_eq!(req.url, "http://x/projects");
    }

    #[test]
    fn empty_token_is_ignored() {
        let req = build_request("http://x", "projects", Some(""), RequestOptions::get());
        assert!(req.header("Authorization").is_none());
    }

    #[test]
    fn caller_headers_override_defaults_in_place() {
        let options = RequestOptions::get()
            .header("content-type", "text/plain")
            .header("X-Workspace", "ws-1");
        let req = build_request("http://x", "/a", Some("t"), options);
        assert_eq!(
            req.headers,
            pairs(&[
                ("Content-Type", "text/plain"),
                ("Accept", JSON),
                ("Authorization", "Bearer t"),
                ("X-Workspace", "ws-1"),
            ])
        );
    }

    #[test]
    fn json_body_is_serialized() {
        let options = RequestOptions::new(HttpMethod::Post)
            .json(&serde_json::json!({ "name": "Weekly" }))
            .unwrap();
        let req = build_request("http://x/", "/projects", None, options);
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"Weekly"}"#));
        assert_eq!(req.url, "http://x/projects");
    }

    #[test]
    fn absolute_endpoint_bypasses_base_url() {
        assert_eq!(
            join_url("http://x", "https://other.example/health"),
            "https://other.example/health"
        );
    }
}
