use axum::routing::get;
use axum::Router;

use crate::handlers::config;
use crate::state::AppState;

/// Routes mounted at `/api/config`.
///
/// ```text
/// POST   /        -> create_config
/// GET    /        -> get_config
/// PATCH  /        -> update_config
/// DELETE /        -> delete_config
/// GET    /export  -> export_config
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(config::get_config)
                .post(config::create_config)
                .patch(config::update_config)
                .delete(config::delete_config),
        )
        .route("/export", get(config::export_config))
}
