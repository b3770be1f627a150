//! Session middleware: resolves the request's actor from its session token.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::session::{SESSION_COOKIE, SessionKeys, find_cookie};

/// Extracts the session token from the `token` cookie, falling back to
/// `Authorization: Bearer <token>`.
fn extract_token(request: &Request<Body>) -> Option<&str> {
    let from_cookie = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookies| find_cookie(cookies, SESSION_COOKIE))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    from_cookie.or_else(|| {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}

/// Inserts an [`Actor`](acquisitions_types::Actor) extension when the request
/// carries a valid session token.
///
/// Never rejects: a missing, forged or expired token leaves the request
/// anonymous.
pub async fn session_middleware(
    State(keys): State<Arc<SessionKeys>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let actor = extract_token(&request).and_then(|token| match keys.verify(token) {
        Ok(actor) => Some(actor),
        Err(e) => {
            tracing::debug!("Ignoring session token: {}", e);
            None
        }
    });

    if let Some(actor) = actor {
        request.extensions_mut().insert(actor);
    }

    next.run(request).await
}
