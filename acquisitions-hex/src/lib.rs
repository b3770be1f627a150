//! # Acquisitions Hex
//!
//! Application services and HTTP adapter for the acquisitions service.
//!
//! ## Architecture
//!
//! - `service` - Credential service (registration and sign-in)
//! - `admission` - Role-aware admission control over a decision engine
//! - `session` - Signed session tokens
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The credential service is generic over `R: UserRepository` and the
//! admission controller over `E: DecisionEngine`, so adapters are injected
//! by the binary.

pub mod admission;
pub mod inbound;
pub mod openapi;
pub mod password;
pub mod service;
pub mod session;


pub use admission::{AdmissionController, AdmissionError, AdmissionOutcome};
pub use service::AuthService;
pub use session::SessionKeys;
