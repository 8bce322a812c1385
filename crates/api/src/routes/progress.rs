//! Route definitions for the progress API.

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progress;
use crate::middleware::rate_limit::{enforce, RateLimiter};
use crate::state::AppState;

/// Routes mounted at `/api/v1/progress`, all behind the progress rate limit.
///
/// ```text
/// GET  /health                      -> health
/// GET  /metrics                     -> metrics
/// GET  /problems/topic/{topic}      -> problems_by_topic
/// GET  /problems/company/{company}  -> problems_by_company
/// GET  /problems/search             -> search_problems
/// GET  /{user_id}                   -> get_progress
/// POST /{user_id}/submissions       -> record_submission
/// GET  /{user_id}/recommendations   -> get_recommendations
/// ```
pub fn router() -> Router<AppState> {
    let limiter = Arc::new(RateLimiter::progress());

    Router::new()
        .route("/health", get(progress::health))
        .route("/metrics", get(progress::metrics))
        .route("/problems/topic/{topic}", get(progress::problems_by_topic))
        .route("/problems/company/{company}", get(progress::problems_by_company))
        .route("/problems/search", get(progress::search_problems))
        .route("/{user_id}", get(progress::get_progress))
        .route("/{user_id}/submissions", post(progress::record_submission))
        .route("/{user_id}/recommendations", get(progress::get_recommendations))
        .route_layer(from_fn_with_state(limiter, enforce))
}
