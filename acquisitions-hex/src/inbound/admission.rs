//! Admission middleware: asks the [`AdmissionController`] about every request.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use acquisitions_types::{Actor, DecisionEngine, ErrorResponse, RequestContext};

use crate::admission::{AdmissionController, AdmissionOutcome};

/// Client address: the socket peer when known, else the first
/// `X-Forwarded-For` hop.
fn client_ip(request: &Request<Body>) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .or_else(|| forwarded_for(request.headers()))
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok())
}

fn request_context(request: &Request<Body>) -> RequestContext {
    RequestContext {
        actor: request.extensions().get::<Actor>().cloned(),
        ip: client_ip(request),
        user_agent: request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_owned),
    }
}

/// Runs admission control before the request reaches a handler.
///
/// Denials become `403`; an engine failure becomes `500`. Neither reaches
/// the handler.
pub async fn admission_middleware<E: DecisionEngine>(
    State(controller): State<Arc<AdmissionController<E>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let context = request_context(&request);

    match controller.evaluate(&context).await {
        Ok(AdmissionOutcome::Allow) => next.run(request).await,
        Ok(AdmissionOutcome::Deny(category)) => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Forbidden".into(),
                message: category.message().into(),
            }),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal Server Error".into(),
                message: "Something went wrong with the security middleware.".into(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_connect_info_wins_over_forwarded_for() {
        let mut request = Request::builder()
            .uri("/api?x=1")
            .header("x-forwarded-for", "10.0.0.9")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

        assert_eq!(
            client_ip(&request),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());

        assert_eq!(
            forwarded_for(&headers),
            Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)))
        );
    }

    #[test]
    fn test_request_context_fields() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/sign-in?next=%2F")
            .header(header::USER_AGENT, "Mozilla/5.0")
            .body(Body::empty())
            .unwrap();

        let context = request_context(&request);

        assert!(context.actor.is_none());
        assert_eq!(context.ip, None);
        assert_eq!(context.method, "POST");
        assert_eq!(context.path, "/api/auth/sign-in");
        assert_eq!(context.query.as_deref(), Some("next=%2F"));
        assert_eq!(context.user_agent.as_deref(), Some("Mozilla/5.0"));
    }
}
