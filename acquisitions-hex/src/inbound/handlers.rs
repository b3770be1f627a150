//! HTTP request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use acquisitions_types::{
    Actor, AppError, AuthResponse, HealthResponse, MessageResponse, SignInRequest, SignUpRequest,
    UserRepository,
};

use crate::AuthService;
use crate::session::SessionKeys;

/// Application state shared across handlers.
pub struct AppState<R: UserRepository> {
    pub service: AuthService<R>,
    pub sessions: Arc<SessionKeys>,
    pub started_at: Instant,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::Validation(vec![rejection.body_text()]))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::Validation(details) => {
                let body = serde_json::json!({
                    "error": "Validation failed",
                    "details": details,
                });
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Plain-text greeting.
pub async fn root() -> &'static str {
    tracing::info!("Hello from acquisitions!");
    "Hello from acquisitions!"
}

/// Health check endpoint.
pub async fn health<R: UserRepository>(State(state): State<Arc<AppState<R>>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".into(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

pub async fn api_status() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Acquisitions API is Running!".into(),
    })
}

/// Register a user and start a session.
#[tracing::instrument(skip(state, payload))]
pub async fn sign_up<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let input = req.validate().map_err(AppError::from)?;

    let user = state
        .service
        .register_user(input)
        .await
        .map_err(AppError::from)?;

    let token = state.sessions.issue(user.id, user.role);
    tracing::info!("User registered successfully: {}", user.email);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, state.sessions.cookie(&token))],
        Json(AuthResponse {
            message: "User registered".into(),
            user,
        }),
    ))
}

/// Authenticate and start a session.
#[tracing::instrument(skip(state, payload))]
pub async fn sign_in<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let credentials = req.validate().map_err(AppError::from)?;

    let user = state
        .service
        .authenticate_user(credentials)
        .await
        .map_err(AppError::from)?;

    let token = state.sessions.issue(user.id, user.role);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, state.sessions.cookie(&token))],
        Json(AuthResponse {
            message: "User signed in successfully".into(),
            user,
        }),
    ))
}

/// Clear the session cookie.
#[tracing::instrument(skip(state, actor))]
pub async fn sign_out<R: UserRepository>(
    State(state): State<Arc<AppState<R>>>,
    actor: Option<Extension<Actor>>,
) -> impl IntoResponse {
    if let Some(Extension(actor)) = actor {
        tracing::info!(user_id = %actor.user_id, "User signed out successfully");
    }

    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(MessageResponse {
            message: "User signed out successfully".into(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_internal_detail_stays_out_of_body() {
        let (status, json) =
            body_of(AppError::Internal("Database error: no such table: users".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
        assert!(!json.to_string().contains("Database"));
    }

    #[tokio::test]
    async fn test_validation_body_lists_details() {
        let (status, json) = body_of(AppError::Validation(vec!["name: too short".into()])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["details"][0], "name: too short");
    }

    #[tokio::test]
    async fn test_unauthorized_and_conflict_statuses() {
        let (status, json) = body_of(AppError::Unauthorized("Invalid email or password".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Invalid email or password");

        let (status, _) = body_of(AppError::Conflict("Error creating user".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
