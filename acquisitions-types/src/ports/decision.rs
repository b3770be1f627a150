//! Decision engine port.
//!
//! The engine that computes bot, shield and rate-limit verdicts. It may be
//! in-process or a remote service; callers only see the tagged [`Decision`].

use crate::domain::{Decision, RequestContext, SlidingWindowRule};
use crate::error::EngineError;

/// Port trait for admission decision engines.
#[async_trait::async_trait]
pub trait DecisionEngine: Send + Sync + 'static {
    /// Evaluates one request against the engine's own protections plus `rule`.
    async fn protect(
        &self,
        request: &RequestContext,
        rule: &SlidingWindowRule,
    ) -> Result<Decision, EngineError>;
}

#[async_trait::async_trait]
impl<T: DecisionEngine + ?Sized> DecisionEngine for std::sync::Arc<T> {
    async fn protect(
        &self,
        request: &RequestContext,
        rule: &SlidingWindowRule,
    ) -> Result<Decision, EngineError> {
        (**self).protect(request, rule).await
    }
}
