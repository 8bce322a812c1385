//! Route definitions for the roadmap API.

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::roadmap;
use crate::middleware::rate_limit::{enforce, RateLimiter};
use crate::state::AppState;

/// Routes mounted at `/api/v1/roadmap`.
///
/// ```text
/// GET    /health                 -> health
/// GET    /{user_id}              -> get_roadmap          (rate limited)
/// POST   /{user_id}/regenerate   -> regenerate_roadmap   (rate limited)
/// DELETE /{user_id}/cache        -> clear_cache
/// ```
pub fn router() -> Router<AppState> {
    let limiter = Arc::new(RateLimiter::roadmap());

    let generation = Router::new()
        .route("/{user_id}", get(roadmap::get_roadmap))
        .route("/{user_id}/regenerate", post(roadmap::regenerate_roadmap))
        .route_layer(from_fn_with_state(limiter, enforce));

    Router::new()
        .route("/health", get(roadmap::health))
        .route("/{user_id}/cache", delete(roadmap::clear_cache))
        .merge(generation)
}
