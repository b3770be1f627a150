//! Admission control domain types.
//!
//! The per-role budget table, the rule handed to a decision engine, and the
//! tagged decision it returns.

use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::user::{Role, UserId};

/// Length of every rate-limit window.
pub const WINDOW: Duration = Duration::from_secs(60);

// ─────────────────────────────────────────────────────────────────────────────
// Role policy
// ─────────────────────────────────────────────────────────────────────────────

/// Request budget for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePolicy {
    pub role: Role,
    /// Requests allowed per [`WINDOW`].
    pub limit: u32,
    pub message: &'static str,
}

impl RolePolicy {
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self {
                role,
                limit: 20,
                message: "Admin request limit exceeded (20 requests per minute). Slow Down!",
            },
            Role::User => Self {
                role,
                limit: 10,
                message: "User request limit exceeded (10 requests per minute). Slow Down!",
            },
            Role::Guest => Self {
                role,
                limit: 5,
                message: "Guest request limit exceeded (5 requests per minute). Slow Down!",
            },
        }
    }

    /// Builds the sliding-window rule for this role. Each role gets its own
    /// bucket name.
    pub fn rule(&self, mode: EngineMode) -> SlidingWindowRule {
        SlidingWindowRule {
            mode,
            interval: WINDOW,
            max: self.limit,
            name: format!("Rate limit for {}", self.role),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine rule
// ─────────────────────────────────────────────────────────────────────────────

/// Whether an engine enforces its verdicts or only reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineMode {
    #[default]
    Live,
    DryRun,
}

impl std::str::FromStr for EngineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LIVE" => Ok(EngineMode::Live),
            "DRY_RUN" => Ok(EngineMode::DryRun),
            other => Err(format!("Unknown engine mode: {}", other)),
        }
    }
}

/// A sliding-window rate-limit rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingWindowRule {
    pub mode: EngineMode,
    pub interval: Duration,
    pub max: u32,
    /// Bucket name; requests are only counted against rules of the same name.
    pub name: String,
}

impl SlidingWindowRule {
    /// Compact interval label, e.g. `"1m"`.
    pub fn interval_label(&self) -> String {
        let secs = self.interval.as_secs();
        if secs > 0 && secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs > 0 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request context
// ─────────────────────────────────────────────────────────────────────────────

/// An authenticated caller as resolved from a session.
///
/// `role` is the raw claim; it is only interpreted by admission control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: String,
}

/// What admission control and decision engines may inspect about a request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub actor: Option<Actor>,
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Decisions
// ─────────────────────────────────────────────────────────────────────────────

/// One reason an engine gave for denying a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialKind {
    Bot,
    Shield,
    RateLimit,
    /// Any reason the engine reports that we do not model.
    Other(String),
}

/// Verdict returned by a decision engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied { reasons: Vec<DenialKind> },
}

impl Decision {
    pub fn denied(kind: DenialKind) -> Self {
        Decision::Denied {
            reasons: vec![kind],
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Denied { .. })
    }

    /// Category reported to the caller, `None` when allowed.
    pub fn category(&self) -> Option<DenialCategory> {
        match self {
            Decision::Allowed => None,
            Decision::Denied { reasons } => Some(DenialCategory::from_reasons(reasons)),
        }
    }
}

/// The single category a denial is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialCategory {
    Bot,
    Shield,
    RateLimit,
    Unknown,
}

impl DenialCategory {
    /// Picks the first matching category: bot, then shield, then rate limit.
    pub fn from_reasons(reasons: &[DenialKind]) -> Self {
        if reasons.contains(&DenialKind::Bot) {
            DenialCategory::Bot
        } else if reasons.contains(&DenialKind::Shield) {
            DenialCategory::Shield
        } else if reasons.contains(&DenialKind::RateLimit) {
            DenialCategory::RateLimit
        } else {
            DenialCategory::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DenialCategory::Bot => "BOT",
            DenialCategory::Shield => "SHIELD",
            DenialCategory::RateLimit => "RATE_LIMIT",
            DenialCategory::Unknown => "UNKNOWN",
        }
    }

    /// Client-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            DenialCategory::Bot => "Automated requests are not allowed.",
            DenialCategory::Shield => "Request blocked by security policy.",
            DenialCategory::RateLimit => "Too many requests.",
            DenialCategory::Unknown => "Request denied by security policy engine.",
        }
    }
}

impl std::fmt::Display for DenialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_limits() {
        assert_eq!(RolePolicy::for_role(Role::Admin).limit, 20);
        assert_eq!(RolePolicy::for_role(Role::User).limit, 10);
        assert_eq!(RolePolicy::for_role(Role::Guest).limit, 5);
    }

    #[test]
    fn test_rule_is_named_per_role() {
        let rule = RolePolicy::for_role(Role::Admin).rule(EngineMode::Live);
        assert_eq!(rule.name, "Rate limit for admin");
        assert_eq!(rule.max, 20);
        assert_eq!(rule.interval, Duration::from_secs(60));
        assert_eq!(rule.interval_label(), "1m");

        let guest = RolePolicy::for_role(Role::Guest).rule(EngineMode::Live);
        assert_ne!(rule.name, guest.name);
    }

    #[test]
    fn test_bot_wins_over_rate_limit() {
        let decision = Decision::Denied {
            reasons: vec![DenialKind::RateLimit, DenialKind::Bot],
        };
        assert_eq!(decision.category(), Some(DenialCategory::Bot));
    }

    #[test]
    fn test_shield_wins_over_rate_limit() {
        let reasons = [DenialKind::RateLimit, DenialKind::Shield];
        assert_eq!(DenialCategory::from_reasons(&reasons), DenialCategory::Shield);
    }

    #[test]
    fn test_unmodelled_reason_is_unknown() {
        let decision = Decision::denied(DenialKind::Other("GEO".into()));
        assert_eq!(decision.category(), Some(DenialCategory::Unknown));

        let empty = Decision::Denied { reasons: vec![] };
        assert_eq!(empty.category(), Some(DenialCategory::Unknown));
    }

    #[test]
    fn test_allowed_has_no_category() {
        assert!(!Decision::Allowed.is_denied());
        assert_eq!(Decision::Allowed.category(), None);
    }

    #[test]
    fn test_engine_mode_parse() {
        assert_eq!("LIVE".parse::<EngineMode>().unwrap(), EngineMode::Live);
        assert_eq!("dry_run".parse::<EngineMode>().unwrap(), EngineMode::DryRun);
        assert!("SOMETIMES".parse::<EngineMode>().is_err());
    }
}
