//! Route definitions for the AI proxy.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// Routes mounted at `/api/ai`.
///
/// ```text
/// POST /chat             -> chat
/// GET  /validate         -> validate_environment_key
/// GET  /status           -> status
/// GET  /validate-cookie  -> validate_cookie
/// GET  /providers        -> list_providers
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(ai::chat))
        .route("/validate", get(ai::validate_environment_key))
        .route("/status", get(ai::status))
        .route("/validate-cookie", get(ai::validate_cookie))
        .route("/providers", get(ai::list_providers))
}
