//! Full round trip against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `ApiClient` over
//! real HTTP through `UreqTransport`, covering success, 204, and each of the
//! three classified error kinds.

use digest_core::{
    ApiClient, ApiError, CreateProject, ErrorPayload, Project, RequestOptions, RuntimeMode,
    UpdateProject,
};
use serde_json::json;

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

#[test]
fn project_lifecycle() {
    let base = start_server();
    let client = ApiClient::new(&base)
        .with_token(mock_server::DEFAULT_TOKEN)
        .with_mode(RuntimeMode::Development);

    // Step 1: list: empty.
    let projects = client.list::<Project>().unwrap();
    assert!(projects.is_empty(), "expected empty list");

    // Step 2: create.
    let created = client
        .create::<Project>(&CreateProject {
            name: "Integration".to_string(),
            description: None,
        })
        .unwrap();
    assert_eq!(created.name, "Integration");

    // Step 3: get.
    let fetched = client.get::<Project>(created.id).unwrap();
    assert_eq!(fetched, created);

    // Step 4: partial update.
    let updated = client
        .update::<Project>(
            created.id,
            &UpdateProject {
                name: None,
                description: Some("weekly roundup".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Integration");
    assert_eq!(updated.description.as_deref(), Some("weekly roundup"));

    // Step 5: raw delete through fetch: 204 yields the status text.
    let value = client
        .fetch(&format!("/projects/{}", created.id), RequestOptions::delete())
        .unwrap();
    assert_eq!(value, json!({ "message": "No Content" }));

    // Step 6: get after delete: generic failure carrying the detail.
    let err = client.get::<Project>(created.id).unwrap_err();
    match err {
        ApiError::Request(payload) => {
            assert_eq!(payload, ErrorPayload::new(404, "Project not found"));
        }
        other => panic!("expected generic request failure, got {other:?}"),
    }
}

#[test]
fn missing_token_is_auth_expired_with_server_detail() {
    let client = ApiClient::new(&start_server());
    let err = client.list::<Project>().unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(
        ErrorPayload::decode(&err.to_string()).unwrap(),
        ErrorPayload::new(401, "Not authenticated")
    );
}

#[test]
fn stale_token_falls_back_to_fixed_text() {
    let client = ApiClient::new(&start_server()).with_token("stale");
    let err = client.fetch("/projects", RequestOptions::get()).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"{"status":401,"error":"Token expired or invalid"}"#
    );
}

#[test]
fn admin_route_is_access_denied() {
    let client = ApiClient::new(&start_server()).with_token(mock_server::DEFAULT_TOKEN);
    let err = client.fetch("/admin", RequestOptions::get()).unwrap_err();
    assert!(err.is_access_denied());
    assert_eq!(err.status(), Some(403));
}

#[test]
fn server_side_validation_uses_first_msg() {
    // Raw fetch skips the client-side checks, so the server sees the blank name.
    let client = ApiClient::new(&start_server()).with_token(mock_server::DEFAULT_TOKEN);
    let options = RequestOptions::new(digest_core::HttpMethod::Post)
        .json(&json!({ "name": "  " }))
        .unwrap();
    let err = client.fetch("/projects", options).unwrap_err();
    assert_eq!(err.payload(), Some(&ErrorPayload::new(422, "name must not be empty")));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}/api"));
    let err = client.fetch("/health", RequestOptions::get()).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
