//! Executes an `HttpRequest` and returns the `HttpResponse` as plain data.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. `UreqTransport` turns off
//! ureq's status-as-error behavior so 4xx/5xx responses come back as data and
//! the classifier decides what they mean. Tests substitute a canned
//! transport.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport over a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let headers = &request.headers;

        // GET and DELETE only carry a body when the caller supplied one, so the
        // wire matches the curl diagnostic.
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, None) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Get, Some(body)) => with_headers(self.agent.get(url), headers)
                .force_send_body()
                .send(body.as_bytes()),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Delete, Some(body)) => with_headers(self.agent.delete(url), headers)
                .force_send_body()
                .send(body.as_bytes()),
            (HttpMethod::Post, body) => {
                with_headers(self.agent.post(url), headers).send(body.unwrap_or("").as_bytes())
            }
            (HttpMethod::Put, body) => {
                with_headers(self.agent.put(url), headers).send(body.unwrap_or("").as_bytes())
            }
            (HttpMethod::Patch, body) => {
                with_headers(self.agent.patch(url), headers).send(body.unwrap_or("").as_bytes())
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        // A 204 carries no body; don't try to read one.
        let body = if status.as_u16() == 204 {
            String::new()
        } else {
            response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(e.to_string()))?
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    use super::*;

    /// Accepts one connection, answers `200 {}` and hands back the raw request.
    fn capture_one() -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
                )
                .unwrap();
            tx.send(String::from_utf8_lossy(&raw).into_owned()).unwrap();
        });

        (format!("http://{addr}"), rx)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn request(method: HttpMethod, url: String, body: Option<&str>) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.map(str::to_string),
        }
    }

    #[test]
    fn delete_with_body_sends_the_body() {
        let (base, rx) = capture_one();
        let req = request(HttpMethod::Delete, format!("{base}/x"), Some(r#"{"ids":[1]}"#));

        let response = UreqTransport::new().execute(&req).unwrap();
        assert_eq!(response.status, 200);

        let raw = rx.recv().unwrap();
        assert!(raw.starts_with("DELETE /x HTTP/1.1"), "{raw}");
        assert!(raw.ends_with(r#"{"ids":[1]}"#), "{raw}");
    }

    #[test]
    fn get_with_body_sends_the_body() {
        let (base, rx) = capture_one();
        let req = request(HttpMethod::Get, format!("{base}/search"), Some(r#"{"q":"rust"}"#));

        UreqTransport::new().execute(&req).unwrap();

        let raw = rx.recv().unwrap();
        assert!(raw.starts_with("GET /search HTTP/1.1"), "{raw}");
        assert!(raw.ends_with(r#"{"q":"rust"}"#), "{raw}");
    }

    #[test]
    fn get_without_body_sends_no_body() {
        let (base, rx) = capture_one();
        let req = request(HttpMethod::Get, format!("{base}/projects"), None);

        let response = UreqTransport::new().execute(&req).unwrap();
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.body, "{}");
        assert_eq!(response.header("content-type"), Some("application/json"));

        let raw = rx.recv().unwrap();
        assert!(raw.ends_with("\r\n\r\n"), "{raw}");
    }
}
