//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod admission;
mod auth;
mod handlers;
mod server;

pub use server::HttpServer;
