//! Renders an `HttpRequest` as an equivalent `curl` command line.
//!
//! Used for the development-mode diagnostic only. Every argument is
//! single-quoted for a POSIX shell; embedded single quotes become `'\''`.

use crate::http::{HttpMethod, HttpRequest};

pub fn render_curl(request: &HttpRequest) -> String {
    let mut parts = vec!["curl".to_string()];

    if request.method != HttpMethod::Get {
        parts.push("-X".to_string());
        parts.push(request.method.as_str().to_string());
    }

    parts.push(shell_quote(&request.url));

    for (name, value) in &request.headers {
        parts.push("-H".to_string());
        parts.push(shell_quote(&format!("{name}: {value}")));
    }

    if let Some(body) = &request.body {
        parts.push("--data-raw".to_string());
        parts.push(shell_quote(body));
    }

    parts.join(" ")
}

fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}
