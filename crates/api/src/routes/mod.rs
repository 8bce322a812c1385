pub mod ai;
pub mod config;
pub mod health;
pub mod progress;
pub mod roadmap;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree (everything except `/health`).
///
/// Route hierarchy:
///
/// ```text
/// /api/ai/chat                                     chat proxy (config required)
/// /api/ai/validate                                 validate environment key
/// /api/ai/status                                   cookie or environment status
/// /api/ai/validate-cookie                          validate cookie config
/// /api/ai/providers                                supported providers
///
/// /api/config                                      create, get, update, delete
/// /api/config/export                               redacted export
///
/// /api/v1/progress/health                          service health
/// /api/v1/progress/metrics                         service metrics (config required)
/// /api/v1/progress/problems/topic/{topic}          problems by topic
/// /api/v1/progress/problems/company/{company}      problems by company
/// /api/v1/progress/problems/search                 search with filters
/// /api/v1/progress/{userId}                        progress report (owner only)
/// /api/v1/progress/{userId}/submissions            record submission (owner only)
/// /api/v1/progress/{userId}/recommendations        recommendations (owner only)
///
/// /api/v1/roadmap/health                           service health
/// /api/v1/roadmap/{userId}                         get or generate (owner only)
/// /api/v1/roadmap/{userId}/regenerate              force regeneration (owner only)
/// /api/v1/roadmap/{userId}/cache                   clear cache (owner only)
/// ```
///
/// Every `/api/v1/progress` route shares one rate limit; roadmap generation
/// has its own, stricter one.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/api/ai", ai::router())
        .nest("/api/config", config::router())
        .nest("/api/v1/progress", progress::router())
        .nest("/api/v1/roadmap", roadmap::router())
}
