//! Request middleware and gating extractors.
//!
//! - [`request_context::request_context`] -- request id scope and cookie resolution.
//! - [`config_cookie::RequireConfig`] -- requires a valid config cookie.
//! - [`rate_limit::enforce`] -- per-client sliding-window limits.

pub mod config_cookie;
pub mod rate_limit;
pub mod request_context;
