//! The gateway every consumer uses to reach the digest API.
//!
//! # Design
//! `ApiClient` holds an immutable base URL, optional bearer token and
//! runtime mode, plus a `Transport`. `fetch` runs the whole pipeline:
//! build the request, emit the curl diagnostic in development mode, execute,
//! classify. The build and classify halves are also exposed on their own so
//! callers with their own I/O can use the client without a transport.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::classify::classify_response;
use crate::config::ClientConfig;
use crate::curl::render_curl;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::mode::RuntimeMode;
use crate::request::{build_request, RequestOptions};
use crate::transport::{Transport, UreqTransport};

#[derive(Clone)]
pub struct ApiClient<T = UreqTransport> {
    base_url: String,
    token: Option<String>,
    mode: RuntimeMode,
    transport: T,
}

impl ApiClient<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new(&config.base_url).with_mode(config.mode);
        match &config.token {
            Some(token) => client.with_token(token),
            None => client,
        }
    }
}

impl<T> ApiClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            mode: RuntimeMode::default(),
            transport,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Build the request for `endpoint` without sending it.
    pub fn build(&self, endpoint: &str, options: RequestOptions) -> HttpRequest {
        build_request(&self.base_url, endpoint, self.token.as_deref(), options)
    }

    /// Classify a response obtained elsewhere.
    pub fn parse(&self, response: &HttpResponse) -> Result<Value, ApiError> {
        classify_response(response)
    }
}

impl<T: Transport> ApiClient<T> {
    /// Send `endpoint` with `options` and classify the response.
    pub fn fetch(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let request = self.build(endpoint, options);
        let response = self.send(&request)?;
        self.parse(&response)
    }

    /// `fetch`, then deserialize the success value into `R`.
    pub fn fetch_json<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<R, ApiError> {
        let value = self.fetch(endpoint, options)?;
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Execute a built request. Emits the curl diagnostic first when the
    /// mode asks for it.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        if self.mode.emits_diagnostics() {
            tracing::info!(target: "digest_core::diagnostic", "{}", render_curl(request));
        }
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, url = %request.url, "received response");
        Ok(response)
    }
}
