//! Per-request context: request id scope and config cookie resolution.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use super::config_cookie::resolve_config;
use crate::response::with_request_id;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Resolve the config cookie into a [`ConfigStatus`](super::config_cookie::ConfigStatus)
/// extension and run the rest of the stack inside the request id scope.
///
/// Must sit inside `SetRequestIdLayer` so the header is already present.
pub async fn request_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let status = resolve_config(&state.cipher, &CookieJar::from_headers(req.headers()), Utc::now());
    req.extensions_mut().insert(status);

    with_request_id(request_id, next.run(req)).await
}
