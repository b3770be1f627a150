//! Admission Decision Engines
//!
//! Adapters for the `DecisionEngine` port. Two implementations are provided:
//!
//! - [`LocalEngine`] runs everything in-process: user-agent bot detection,
//!   a request shield for common attack payloads, and sliding-window rate
//!   limiting over a `DashMap` of per-client request logs.
//! - [`HttpEngine`] forwards each request to a remote decision service and
//!   maps its verdict into a [`Decision`](acquisitions_types::Decision).
//!
//! # Example
//! ```
//! use acquisitions_types::{EngineMode, RequestContext, Role, RolePolicy};
//! use decision_engine::{LocalEngine, LocalEngineConfig};
//!
//! let engine = LocalEngine::new(LocalEngineConfig::default());
//! let rule = RolePolicy::for_role(Role::Guest).rule(EngineMode::Live);
//! let request = RequestContext {
//!     user_agent: Some("Mozilla/5.0".into()),
//!     path: "/api".into(),
//!     ..Default::default()
//! };
//! assert!(!engine.evaluate(&request, &rule).is_denied());
//! ```

pub mod bot;
pub mod local;
pub mod remote;
pub mod shield;

pub use local::{LocalEngine, LocalEngineConfig};
pub use remote::HttpEngine;
