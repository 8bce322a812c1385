//! HTTP surface of the interview-prep backend.
//!
//! Wires the domain services from `prep-core` and the provider adapters from
//! `prep-providers` into an axum router. The binary in `main.rs` and the
//! integration tests both build the app through [`router::build_app_router`].

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
