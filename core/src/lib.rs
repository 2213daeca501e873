//! Blocking API client core for the digest service.
//!
//! # Overview
//! Every consumer reaches the remote API through `ApiClient`: the request
//! builder merges caller options with default headers and the bearer token,
//! development mode logs an equivalent `curl` command, and the response
//! classifier turns the status code into a success value or one of three
//! error kinds (auth expired, access denied, generic).
//!
//! # Design
//! - Requests and responses are plain data (`http`); only `transport`
//!   performs I/O, so the builder and classifier are deterministic.
//! - Classified errors display as the JSON string `{"status":..,"error":..}`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod classify;
pub mod client;
pub mod config;
pub mod curl;
pub mod error;
pub mod http;
pub mod mode;
pub mod request;
pub mod resource;
pub mod state;
pub mod transport;
pub mod types;

pub use classify::classify_response;
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use curl::render_curl;
pub use error::{ApiError, ErrorPayload, FieldError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mode::RuntimeMode;
pub use request::RequestOptions;
pub use resource::Resource;
pub use state::{FileStore, MemoryStore, StateError, StateKey, StateStore};
pub use transport::{Transport, UreqTransport};
pub use types::*;
