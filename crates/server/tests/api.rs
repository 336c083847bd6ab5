use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use configs::AppConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let cfg = AppConfig::default();
    let (state, _resources) = server::build_state(&cfg).await.expect("memory backend");
    server::build_app(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, headers, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn register_login_and_fetch_player() {
    let app = app().await;

    let (status, _, body) = send(&app, post_json("/api/v1/register", json!({"username": "alice", "password": "s3cret"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["balance"], "0.00");

    let (status, _, body) = send(&app, post_json("/api/v1/login", json!({"username": "alice", "password": "s3cret"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], "mock-jwt-token-for-player-1");

    let (status, _, body) = send(&app, get("/api/v1/players/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("secret").is_none());
}

#[tokio::test]
async fn login_failures_are_unauthorized() {
    let app = app().await;
    send(&app, post_json("/api/v1/register", json!({"username": "alice", "password": "s3cret"}))).await;

    let (status, _, body) = send(&app, post_json("/api/v1/login", json!({"username": "alice", "password": "wrong"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    assert!(body.get("data").is_none());

    let (status, _, _) = send(&app, post_json("/api/v1/login", json!({"username": "bob", "password": "s3cret"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_requests_are_bad_request() {
    let app = app().await;

    let (status, _, body) = send(&app, post_json("/api/v1/login", json!({"username": "alice"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _, _) = send(&app, post_json("/api/v1/register", json!({"username": "", "password": "pw"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) =
        send(&app, post_json("/api/v1/register", json!({"username": "rich", "password": "pw", "balance": "100000000"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    for uri in ["/api/v1/players/abc", "/api/v1/players/0", "/api/v1/players/-3"] {
        let (status, _, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], 400);
    }
}

#[tokio::test]
async fn unknown_player_is_not_found() {
    let app = app().await;
    let (status, _, body) = send(&app, get("/api/v1/players/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app().await;
    let req = || post_json("/api/v1/register", json!({"username": "alice", "password": "s3cret"}));
    let (status, _, _) = send(&app, req()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, body) = send(&app, req()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
}

#[tokio::test]
async fn health_reports_memory_mode() {
    let app = app().await;
    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["components"]["memory_store"]["status"], "UP");
    assert_eq!(body["components"]["database"]["status"], "DISABLED");
    assert_eq!(body["components"]["redis"]["status"], "DISABLED");
    assert_eq!(body["components"]["messaging"]["status"], "DISABLED");
    assert!(body["uptime"].is_string());
    assert!(body["system"]["pid"].is_u64());
}

#[tokio::test]
async fn trace_id_is_echoed_and_request_id_generated() {
    let app = app().await;
    let req = Request::get("/health").header("X-Trace-ID", "trace-abc").body(Body::empty()).unwrap();
    let (_, headers, _) = send(&app, req).await;
    assert_eq!(headers["x-trace-id"], "trace-abc");
    assert!(!headers["x-request-id"].is_empty());

    let (_, headers, _) = send(&app, get("/health")).await;
    assert!(headers.contains_key("x-trace-id"));
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let app = app().await;
    let (status, _, body) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/players/{id}"].is_object());
    assert!(body["paths"]["/health"].is_object());
}
