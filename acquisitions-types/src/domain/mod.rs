//! Domain models for the acquisitions service.

pub mod admission;
pub mod user;

pub use admission::{
    Actor, Decision, DenialCategory, DenialKind, EngineMode, RequestContext, RolePolicy,
    SlidingWindowRule,
};
pub use user::{NewUser, PublicUser, Role, User, UserId};
