//! In-process decision engine.
//!
//! Rate limiting is a sliding-window log: each `(rule, client)` bucket keeps
//! the instants of the requests it admitted during the last `interval`. A
//! request is admitted only while fewer than `max` of those remain, so no
//! span of `interval` ever admits more than `max` requests.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use acquisitions_types::{
    Decision, DecisionEngine, DenialKind, EngineError, EngineMode, RequestContext,
    SlidingWindowRule,
};

use crate::{bot, shield};

/// Bucket key for requests without a known client address.
const ANONYMOUS_CLIENT: &str = "anonymous";

/// Which protections run besides the per-request rate rule.
#[derive(Debug, Clone, Copy)]
pub struct LocalEngineConfig {
    pub detect_bots: bool,
    pub shield: bool,
}

impl Default for LocalEngineConfig {
    fn default() -> Self {
        Self {
            detect_bots: true,
            shield: true,
        }
    }
}

/// Decision engine that evaluates every protection in-process.
pub struct LocalEngine {
    config: LocalEngineConfig,
    windows: DashMap<WindowKey, Window>,
}

/// One bucket per rule and client. Rules are told apart by name and shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WindowKey {
    rule: String,
    max: u32,
    interval: Duration,
    client: String,
}

impl WindowKey {
    fn of(request: &RequestContext, rule: &SlidingWindowRule) -> Self {
        Self {
            rule: rule.name.clone(),
            max: rule.max,
            interval: rule.interval,
            client: request
                .ip
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string()),
        }
    }
}

/// Admission instants within the trailing interval, oldest first.
#[derive(Debug, Default)]
struct Window {
    admitted: VecDeque<Instant>,
}

impl Window {
    fn expire(&mut self, now: Instant, interval: Duration) {
        while let Some(oldest) = self.admitted.front() {
            if now.duration_since(*oldest) >= interval {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }

    fn try_admit(&mut self, now: Instant, max: u32, interval: Duration) -> bool {
        self.expire(now, interval);

        if self.admitted.len() < max as usize {
            self.admitted.push_back(now);
            true
        } else {
            false
        }
    }
}

impl LocalEngine {
    pub fn new(config: LocalEngineConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Evaluates a request synchronously. Every matching reason is reported.
    pub fn evaluate(&self, request: &RequestContext, rule: &SlidingWindowRule) -> Decision {
        self.evaluate_at(request, rule, Instant::now())
    }

    /// Evaluates a request as of `now`.
    pub fn evaluate_at(
        &self,
        request: &RequestContext,
        rule: &SlidingWindowRule,
        now: Instant,
    ) -> Decision {
        let mut reasons = Vec::new();

        if self.config.detect_bots && bot::is_automated(request.user_agent.as_deref()) {
            reasons.push(DenialKind::Bot);
        }

        if self.config.shield && shield::is_suspicious(&request.path, request.query.as_deref()) {
            reasons.push(DenialKind::Shield);
        }

        if !self.admit(request, rule, now) {
            reasons.push(DenialKind::RateLimit);
        }

        if reasons.is_empty() {
            return Decision::Allowed;
        }

        if rule.mode == EngineMode::DryRun {
            tracing::info!(
                rule = %rule.name,
                path = %request.path,
                ?reasons,
                "Dry run: request would have been denied"
            );
            return Decision::Allowed;
        }

        Decision::Denied { reasons }
    }

    /// Counts the request against `rule` and reports whether it fits the budget.
    fn admit(&self, request: &RequestContext, rule: &SlidingWindowRule, now: Instant) -> bool {
        if rule.max == 0 {
            return false;
        }

        self.windows
            .entry(WindowKey::of(request, rule))
            .or_default()
            .try_admit(now, rule.max, rule.interval)
    }

    /// Drops buckets with no admission inside their interval.
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&self, now: Instant) {
        self.windows.retain(|key, window| {
            window.expire(now, key.interval);
            !window.admitted.is_empty()
        });
    }

    /// Number of live `(rule, client)` buckets.
    pub fn bucket_count(&self) -> usize {
        self.windows.len()
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new(LocalEngineConfig::default())
    }
}

#[async_trait]
impl DecisionEngine for LocalEngine {
    async fn protect(
        &self,
        request: &RequestContext,
        rule: &SlidingWindowRule,
    ) -> Result<Decision, EngineError> {
        Ok(self.evaluate(request, rule))
    }
}
