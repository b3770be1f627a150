//! # Acquisitions Client SDK
//!
//! A typed Rust client for the Acquisitions API.

use acquisitions_types::{
    AuthResponse, HealthResponse, MessageResponse, PublicUser, Role, SignInRequest, SignUpRequest,
};
use reqwest::{Client, header};
use serde::de::DeserializeOwned;

/// Sent on every request; the server denies requests without a user agent.
const USER_AGENT: &str = concat!("acquisitions-client/", env!("CARGO_PKG_VERSION"));

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response did not carry a session token")]
    MissingSession,
}

/// A signed-in user and the session token the server issued.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: PublicUser,
    pub token: String,
}

/// Acquisitions API client.
pub struct AcquisitionsClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl AcquisitionsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Sends `token` as a bearer session on later requests.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self
            .authorized(self.http.get(format!("{}/health", self.base_url)))
            .send()
            .await?;
        handle_response(resp).await
    }

    /// Registers a user and keeps the returned session.
    pub async fn sign_up(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Session, ClientError> {
        let req = SignUpRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        };
        self.start_session("/api/auth/sign-up", &req).await
    }

    /// Signs in and keeps the returned session.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session, ClientError> {
        let req = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.start_session("/api/auth/sign-in", &req).await
    }

    /// Signs out and forgets the session.
    pub async fn sign_out(&mut self) -> Result<MessageResponse, ClientError> {
        let resp = self
            .authorized(self.http.post(format!("{}/api/auth/sign-out", self.base_url)))
            .send()
            .await?;
        let message = handle_response(resp).await?;
        self.token = None;
        Ok(message)
    }

    async fn start_session<B: serde::Serialize>(
        &mut self,
        path: &str,
        body: &B,
    ) -> Result<Session, ClientError> {
        let resp = self
            .authorized(self.http.post(format!("{}{}", self.base_url, path)))
            .json(body)
            .send()
            .await?;

        let token = session_token(resp.headers());
        let auth: AuthResponse = handle_response(resp).await?;
        let token = token.ok_or(ClientError::MissingSession)?;

        self.token = Some(token.clone());
        Ok(Session {
            user: auth.user,
            token,
        })
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

/// Pulls the session token out of the `Set-Cookie` headers.
fn session_token(headers: &header::HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.trim().strip_prefix("token="))
        .find(|token| !token.is_empty())
        .map(String::from)
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Best human-readable message from an error body.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    let error = json.get("error").and_then(|e| e.as_str());
    let detail = json
        .get("message")
        .and_then(|m| m.as_str())
        .map(String::from)
        .or_else(|| {
            json.get("details").and_then(|d| d.as_array()).map(|details| {
                details
                    .iter()
                    .filter_map(|d| d.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            })
        });

    match (error, detail) {
        (Some(error), Some(detail)) => format!("{}: {}", error, detail),
        (Some(error), None) => error.to_string(),
        (None, Some(detail)) => detail,
        (None, None) => body.to_string(),
    }
}
