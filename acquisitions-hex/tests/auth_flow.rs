//! End-to-end tests for the auth routes over an in-memory SQLite store.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use acquisitions_hex::session::DEFAULT_TTL;
use acquisitions_hex::{AdmissionController, AuthService, SessionKeys, inbound::HttpServer};
use acquisitions_repo::SqliteRepo;
use acquisitions_types::{Decision, DecisionEngine, EngineError, RequestContext, SlidingWindowRule};

/// Engine that admits everything, so these tests only see the auth routes.
struct AllowAll;

#[async_trait]
impl DecisionEngine for AllowAll {
    async fn protect(
        &self,
        _request: &RequestContext,
        _rule: &SlidingWindowRule,
    ) -> Result<Decision, EngineError> {
        Ok(Decision::Allowed)
    }
}

async fn create_app() -> axum::Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    HttpServer::new(
        AuthService::new(repo),
        AdmissionController::new(AllowAll),
        SessionKeys::new("test-secret", DEFAULT_TTL),
    )
    .router()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn sign_up_body(email: &str) -> String {
    format!(
        r#"{{"name":"Alice","email":"{}","password":"secret1"}}"#,
        email
    )
}

fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_root_and_status_routes() {
    let app = create_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Hello from acquisitions!");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        json_body(response).await["message"],
        "Acquisitions API is Running!"
    );

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["status"], "OK");
    assert!(json["timestamp"].is_string());
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_sign_up_returns_public_user_and_cookie() {
    let app = create_app().await;

    let response = app
        .oneshot(post_json(
            "/api/auth/sign-up",
            r#"{"name":"Alice","email":" A@X.io ","password":"secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let json = json_body(response).await;
    assert_eq!(json["message"], "User registered");
    assert_eq!(json["user"]["name"], "Alice");
    assert_eq!(json["user"]["email"], "a@x.io");
    assert_eq!(json["user"]["role"], "user");
    assert!(json["user"]["id"].is_string());
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_sign_up_is_409() {
    let app = create_app().await;

    let first = app
        .clone()
        .oneshot(post_json("/api/auth/sign-up", &sign_up_body("a@x.io")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(post_json("/api/auth/sign-up", &sign_up_body("a@x.io")))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(second).await["error"], "Error creating user");
}

#[tokio::test]
async fn test_invalid_sign_up_is_400() {
    let app = create_app().await;

    let response = app
        .oneshot(post_json(
            "/api/auth/sign-up",
            r#"{"name":"A","email":"not-an-email","password":"123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(json["details"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_role_is_400() {
    let app = create_app().await;

    let response = app
        .oneshot(post_json(
            "/api/auth/sign-up",
            r#"{"name":"Alice","email":"a@x.io","password":"secret1","role":"root"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Validation failed");
}

#[tokio::test]
async fn test_sign_in_flow() {
    let app = create_app().await;

    app.clone()
        .oneshot(post_json("/api/auth/sign-up", &sign_up_body("a@x.io")))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/sign-in",
            r#"{"email":"A@x.io","password":"secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).starts_with("token="));
    let json = json_body(response).await;
    assert_eq!(json["message"], "User signed in successfully");
    assert_eq!(json["user"]["email"], "a@x.io");
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let app = create_app().await;

    app.clone()
        .oneshot(post_json("/api/auth/sign-up", &sign_up_body("a@x.io")))
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/sign-in",
            r#"{"email":"a@x.io","password":"wrong-one"}"#,
        ))
        .await
        .unwrap();
    let unknown_email = app
        .oneshot(post_json(
            "/api/auth/sign-in",
            r#"{"email":"b@x.io","password":"secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(wrong_password).await, json_body(unknown_email).await);
}

#[tokio::test]
async fn test_sign_out_clears_cookie() {
    let app = create_app().await;

    let response = app
        .oneshot(post_json("/api/auth/sign-out", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert_eq!(
        json_body(response).await["message"],
        "User signed out successfully"
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["paths"]["/api/auth/sign-up"].is_object());
}
