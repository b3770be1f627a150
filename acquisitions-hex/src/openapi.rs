//! OpenAPI document and Swagger UI schema.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use acquisitions_types::domain::{PublicUser, Role, UserId};
use acquisitions_types::dto::{
    AuthResponse, ErrorResponse, HealthResponse, MessageResponse, SignInRequest, SignUpRequest,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Greeting
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Plain-text greeting", body = String, example = json!("Hello from acquisitions!")),
        (status = 403, description = "Denied by admission control", body = ErrorResponse)
    )
)]
async fn root() {}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 403, description = "Denied by admission control", body = ErrorResponse)
    )
)]
async fn health() {}

/// API status
#[utoipa::path(
    get,
    path = "/api",
    tag = "health",
    responses(
        (status = 200, description = "API is running", body = MessageResponse, example = json!({"message": "Acquisitions API is Running!"}))
    )
)]
async fn api_status() {}

/// Register a new user and start a session
#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered; session cookie set", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Denied by admission control", body = ErrorResponse),
        (status = 409, description = "User could not be created")
    )
)]
async fn sign_up() {}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Denied by admission control", body = ErrorResponse)
    )
)]
async fn sign_in() {}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    tag = "auth",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    )
)]
async fn sign_out() {}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Acquisitions API",
        version = "0.1.0",
        description = "User registration and sign-in behind role-aware admission control",
        license(name = "MIT"),
    ),
    paths(root, health, api_status, sign_up, sign_in, sign_out),
    components(
        schemas(
            SignUpRequest,
            SignInRequest,
            AuthResponse,
            MessageResponse,
            HealthResponse,
            ErrorResponse,
            PublicUser,
            Role,
            UserId,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness endpoints"),
        (name = "auth", description = "Registration and sessions"),
    )
)]
pub struct ApiDoc;

/// Session token accepted as a bearer token or the `token` cookie.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
        }
    }
}
