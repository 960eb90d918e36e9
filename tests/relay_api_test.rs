//! End-to-end tests for the relay endpoint
//!
//! The router is driven in-process with `oneshot`; geolocation providers and
//! the Telegram Bot API are wiremock servers.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use visitor_relay::models::config::ProviderEndpoints;
use visitor_relay::utils::constants::NO_PROVIDER;
use visitor_relay::{create_router, AppState, RelayConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:TEST-TOKEN";
const CHAT_ID: &str = "-100042";
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn config(endpoints: ProviderEndpoints, telegram_url: &str, with_credentials: bool) -> RelayConfig {
    RelayConfig {
        bot_token: with_credentials.then(|| TOKEN.to_string()),
        chat_id: with_credentials.then(|| CHAT_ID.to_string()),
        telegram_api_url: telegram_url.to_string(),
        providers: endpoints,
        geo_timeout: Duration::from_secs(2),
        telegram_timeout: Duration::from_secs(2),
        ..RelayConfig::default()
    }
}

fn unreachable_endpoints() -> ProviderEndpoints {
    ProviderEndpoints {
        ipapi_co: UNREACHABLE.to_string(),
        ip_api_com: UNREACHABLE.to_string(),
        ipinfo: UNREACHABLE.to_string(),
    }
}

fn app(config: RelayConfig) -> Router {
    create_router(Arc::new(AppState::new(config)))
}

async fn mount_telegram_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"message_id": 7, "chat": {"id": -100042}, "text": "..."}
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn sent_payload(server: &MockServer) -> serde_json::Value {
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1, "exactly one Telegram call expected");
    serde_json::from_slice(&requests[0].body).unwrap()
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_cors(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, Accept");
}

#[tokio::test]
async fn test_relay_with_first_provider() {
    let ipapi_co = MockServer::start().await;
    let ip_api_com = MockServer::start().await;
    let telegram = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/8.8.8.8/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "country_name": "United States",
            "city": "Mountain View",
            "org": "Google LLC"
        })))
        .expect(1)
        .mount(&ipapi_co)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ip_api_com)
        .await;
    mount_telegram_ok(&telegram).await;

    let endpoints = ProviderEndpoints {
        ipapi_co: ipapi_co.uri(),
        ip_api_com: ip_api_com.uri(),
        ipinfo: UNREACHABLE.to_string(),
    };
    let response = app(config(endpoints, &telegram.uri(), true))
        .oneshot(post_json(r#"{"ip":"8.8.8.8"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_json(response).await, serde_json::json!({"success": true}));

    let payload = sent_payload(&telegram).await;
    assert_eq!(payload["chat_id"], CHAT_ID);
    assert_eq!(payload["parse_mode"], "HTML");
    let text = payload["text"].as_str().unwrap();
    assert!(text.contains("United States"));
    assert!(text.contains("Mountain View"));
    assert!(text.contains("Google LLC"));
    assert!(text.contains("not available"), "defaulted client fields must be shown");
}

#[tokio::test]
async fn test_relay_succeeds_when_all_providers_are_down() {
    let telegram = MockServer::start().await;
    mount_telegram_ok(&telegram).await;

    let response = app(config(unreachable_endpoints(), &telegram.uri(), true))
        .oneshot(post_json(
            r#"{"ip":"8.8.8.8","userAgent":"Mozilla/5.0 (X11; Linux x86_64)","screenResolution":"2560x1440","timezone":"Europe/Berlin"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"success": true}));

    let payload = sent_payload(&telegram).await;
    let text = payload["text"].as_str().unwrap();
    assert!(text.contains(NO_PROVIDER));
    assert!(text.contains("2560x1440"));
    assert!(text.contains("Europe/Berlin"));
}

#[tokio::test]
async fn test_missing_credentials_returns_500() {
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&telegram)
        .await;

    let response = app(config(unreachable_endpoints(), &telegram.uri(), false))
        .oneshot(post_json(r#"{"ip":"8.8.8.8"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "BOT_TOKEN or CHAT_ID is not set in the environment"})
    );
}

#[tokio::test]
async fn test_telegram_error_body_is_surfaced() {
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        ))
        .expect(1)
        .mount(&telegram)
        .await;

    let response = app(config(unreachable_endpoints(), &telegram.uri(), true))
        .oneshot(post_json(r#"{"ip":"8.8.8.8"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Telegram API error"));
    assert!(error.contains("chat not found"));
}

async fn mount_telegram_reply(server: &MockServer, reply: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(reply)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_telegram_ok_false_with_200_is_failure() {
    let telegram = MockServer::start().await;
    mount_telegram_reply(
        &telegram,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Forbidden: bot was blocked"
        })),
    )
    .await;

    let response = app(config(unreachable_endpoints(), &telegram.uri(), true))
        .oneshot(post_json(r#"{"ip":"8.8.8.8"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "Telegram API error: Forbidden: bot was blocked"})
    );
}

#[tokio::test]
async fn test_telegram_non_json_200_is_failure() {
    let telegram = MockServer::start().await;
    mount_telegram_reply(
        &telegram,
        ResponseTemplate::new(200).set_body_string("<html>gateway</html>"),
    )
    .await;

    let response = app(config(unreachable_endpoints(), &telegram.uri(), true))
        .oneshot(post_json(r#"{"ip":"8.8.8.8"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid Telegram response");
}

#[tokio::test]
async fn test_telegram_ok_without_result_is_success() {
    let telegram = MockServer::start().await;
    mount_telegram_reply(
        &telegram,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
    )
    .await;

    let response = app(config(unreachable_endpoints(), &telegram.uri(), true))
        .oneshot(post_json(r#"{"ip":"8.8.8.8"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"success": true}));
}

#[tokio::test]
async fn test_malformed_body_returns_500_without_outbound_calls() {
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&telegram)
        .await;

    let response = app(config(unreachable_endpoints(), &telegram.uri(), true))
        .oneshot(post_json("{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid request body"));
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let response = app(config(unreachable_endpoints(), UNREACHABLE, true))
        .oneshot(Request::builder().method(Method::GET).uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(&response);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_options_preflight() {
    let response = app(config(unreachable_endpoints(), UNREACHABLE, true))
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/")
                .header(header::ORIGIN, "https://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors(&response);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_health_check() {
    let response = app(config(unreachable_endpoints(), UNREACHABLE, false))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
