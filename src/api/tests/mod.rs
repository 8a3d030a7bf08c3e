use super::*;
use crate::config::{AirtableConfig, DownloadConfig};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt; // for oneshot
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod files;

/// A router wired to a mock tabular API and a temp download directory
struct TestApp {
    app: Router,
    server: MockServer,
    dir: tempfile::TempDir,
}

/// Build a relay + router against fresh mocks, letting the caller tweak the
/// config before construction
async fn build_app(configure: impl FnOnce(&mut Config)) -> TestApp {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let mut config = Config {
        airtable: AirtableConfig {
            api_key: "test-key".into(),
            base_id: "base".into(),
            table_name: "Table".into(),
            api_url: server.uri(),
        },
        download: DownloadConfig {
            download_dir: dir.path().to_path_buf(),
        },
        ..Config::default()
    };
    configure(&mut config);

    let relay = Arc::new(AttachmentRelay::new(config.clone()).expect("relay"));
    let app = create_router(relay, Arc::new(config));

    TestApp { app, server, dir }
}

/// Mount a record listing carrying one attachment plus the CDN endpoint
/// serving its bytes
async fn mount_attachment(server: &MockServer, field: &str, file_name: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/base/Table"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"fields": {field: [
                {"url": format!("{}/cdn/{file_name}", server.uri()), "filename": file_name}
            ]}}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/cdn/{file_name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = Config {
        airtable: AirtableConfig {
            api_url: server.uri(),
            ..AirtableConfig::default()
        },
        ..Config::default()
    };
    config.download.download_dir = dir.path().to_path_buf();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap(); // OS assigns a free port
    let relay = Arc::new(AttachmentRelay::new(config.clone()).unwrap());
    let config = Arc::new(config);

    let api_handle = tokio::spawn(async move { start_api_server(relay, config).await });

    // Give it a moment to start, then tear it down.
    tokio::time::sleep(Duration::from_millis(100)).await;
    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let test = build_app(|config| {
        config.server.cors_enabled = true;
        config.server.cors_origins = vec!["*".to_string()];
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled_omits_headers() {
    let test = build_app(|config| {
        config.server.cors_enabled = false;
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = test.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be absent when CORS is disabled"
    );
}

#[tokio::test]
async fn test_bearer_token_guards_all_routes() {
    let test = build_app(|config| {
        config.server.auth_token = Some("relay-secret".into());
    })
    .await;

    let response = get(&test.app, "/health").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/health")
        .header("authorization", "Bearer relay-secret")
        .body(Body::empty())
        .unwrap();
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let test = build_app(|_| {}).await;
    let response = get(&test.app, "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
