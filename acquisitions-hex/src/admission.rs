//! Admission Controller
//!
//! Gates every request against a per-role rate budget. The verdict itself
//! comes from a `DecisionEngine`; this layer picks the rule, asks, and
//! classifies the answer.

use acquisitions_types::{
    Actor, DecisionEngine, DenialCategory, EngineError, EngineMode, RequestContext, Role,
    RolePolicy,
};

/// Terminal result of admission for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Allow,
    Deny(DenialCategory),
}

/// Admission could not reach a verdict. Never a denial.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("Decision engine failed: {0}")]
    Engine(#[from] EngineError),
}

/// Resolves the role whose budget applies.
///
/// No actor means `guest`. A role claim we do not recognize also gets the
/// guest budget.
pub fn resolve_role(actor: Option<&Actor>) -> Role {
    let Some(actor) = actor else {
        return Role::Guest;
    };

    actor.role.parse().unwrap_or_else(|_| {
        tracing::warn!(
            user_id = %actor.user_id,
            role = %actor.role,
            "Unrecognized role claim, applying guest budget"
        );
        Role::Guest
    })
}

/// Role-aware admission control over a pluggable decision engine.
pub struct AdmissionController<E: DecisionEngine> {
    engine: E,
    mode: EngineMode,
}

impl<E: DecisionEngine> AdmissionController<E> {
    /// Creates a controller enforcing its rules (`LIVE`).
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            mode: EngineMode::Live,
        }
    }

    pub fn with_mode(mut self, mode: EngineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Decides whether a request may proceed.
    ///
    /// Denials are logged at WARN, engine failures at ERROR. Neither is retried.
    pub async fn evaluate(
        &self,
        request: &RequestContext,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        let role = resolve_role(request.actor.as_ref());
        let policy = RolePolicy::for_role(role);
        let rule = policy.rule(self.mode);

        let decision = match self.engine.protect(request, &rule).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::error!(
                    ip = ?request.ip,
                    path = %request.path,
                    rule = %rule.name,
                    "Error in security middleware: {}",
                    e
                );
                return Err(e.into());
            }
        };

        let Some(category) = decision.category() else {
            return Ok(AdmissionOutcome::Allow);
        };

        let ip = request.ip.map(|ip| ip.to_string()).unwrap_or_default();
        let user_agent = request.user_agent.as_deref().unwrap_or_default();

        match category {
            DenialCategory::Bot => tracing::warn!(
                %ip, %user_agent, path = %request.path, category = %category,
                "Bot request blocked"
            ),
            DenialCategory::Shield => tracing::warn!(
                %ip, %user_agent, path = %request.path, category = %category,
                "Shield blocked request"
            ),
            DenialCategory::RateLimit => tracing::warn!(
                %ip, %user_agent, path = %request.path, category = %category,
                role = %role, "{}", policy.message
            ),
            DenialCategory::Unknown => tracing::warn!(
                %ip, %user_agent, path = %request.path, category = %category,
                ?decision, "Unknown denial reason"
            ),
        }

        Ok(AdmissionOutcome::Deny(category))
    }
}
