//! Domain layer for the interview-prep backend.
//!
//! Holds everything that does not speak HTTP: the encrypted configuration
//! cookie, the provider catalog, the mock progress service and the roadmap
//! prompt/parse/cache pipeline. The `api` crate wires these into routes.

pub mod cookie_cipher;
pub mod error;
pub mod progress;
pub mod provider_catalog;
pub mod roadmap;
pub mod types;
pub mod user_config;
