//! Remote decision engine client.
//!
//! Sends the request fingerprint and the rule to an external decision
//! service and maps the reply into a [`Decision`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use acquisitions_types::{
    Decision, DecisionEngine, DenialKind, EngineError, EngineMode, RequestContext,
    SlidingWindowRule,
};

/// HTTP client for a remote decision service.
pub struct HttpEngine {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

impl HttpEngine {
    /// Creates a client posting to `{base_url}/v1/decide`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            endpoint: format!("{}/v1/decide", base_url.trim_end_matches('/')),
            api_key: None,
            http: Client::new(),
        }
    }

    /// Sets the key sent as a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DecisionEngine for HttpEngine {
    async fn protect(
        &self,
        request: &RequestContext,
        rule: &SlidingWindowRule,
    ) -> Result<Decision, EngineError> {
        let body = ProtectRequest::new(request, rule);

        let mut req = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::Status(status.as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        parse_decision(&bytes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ProtectRequest<'a> {
    rule: WireRule<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
    method: &'a str,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireRule<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    mode: EngineMode,
    interval: String,
    max: u32,
    name: &'a str,
}

impl<'a> ProtectRequest<'a> {
    fn new(request: &'a RequestContext, rule: &'a SlidingWindowRule) -> Self {
        Self {
            rule: WireRule {
                kind: "SLIDING_WINDOW",
                mode: rule.mode,
                interval: rule.interval_label(),
                max: rule.max,
                name: &rule.name,
            },
            ip: request.ip.map(|ip| ip.to_string()),
            user_agent: request.user_agent.as_deref(),
            method: &request.method,
            path: &request.path,
            query: request.query.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Conclusion {
    Allow,
    Deny,
    Error,
}

#[derive(Debug, Deserialize)]
struct ProtectResponse {
    conclusion: Conclusion,
    #[serde(default)]
    reasons: Vec<String>,
}

fn parse_reason(reason: String) -> DenialKind {
    match reason.as_str() {
        "BOT" => DenialKind::Bot,
        "SHIELD" => DenialKind::Shield,
        "RATE_LIMIT" => DenialKind::RateLimit,
        _ => DenialKind::Other(reason),
    }
}

fn parse_decision(bytes: &[u8]) -> Result<Decision, EngineError> {
    let resp: ProtectResponse =
        serde_json::from_slice(bytes).map_err(|e| EngineError::Decode(e.to_string()))?;

    match resp.conclusion {
        Conclusion::Allow => Ok(Decision::Allowed),
        Conclusion::Deny => Ok(Decision::Denied {
            reasons: resp.reasons.into_iter().map(parse_reason).collect(),
        }),
        Conclusion::Error => Err(EngineError::Decode(format!(
            "engine reported an error: {}",
            resp.reasons.join(", ")
        ))),
    }
}
