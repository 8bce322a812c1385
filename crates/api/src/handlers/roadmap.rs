//! Handlers for the roadmap API (`/api/v1/roadmap`).

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use prep_core::roadmap::{PreferredDifficulty, RoadmapPreferences, StudyRoadmap};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::roadmap::RoadmapError;
use crate::error::AppResult;
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::config_cookie::RequireConfig;
use crate::response::{ApiResponse, Meta};
use crate::state::AppState;

use super::check_user_id;

/// Query string for `GET /{userId}`. Preference fields are optional steering.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapQuery {
    #[serde(default)]
    pub regenerate: bool,
    #[validate(length(max = 100))]
    pub timeline: Option<String>,
    #[validate(length(max = 100))]
    pub target_role: Option<String>,
    pub difficulty: Option<PreferredDifficulty>,
}

impl RoadmapQuery {
    fn preferences(&self) -> Option<RoadmapPreferences> {
        let prefs = RoadmapPreferences {
            target_role: self.target_role.clone(),
            timeline_to_interview: self.timeline.clone(),
            preferred_difficulty: self.difficulty,
            focus_areas: None,
        };
        (!prefs.is_empty()).then_some(prefs)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheCleared {
    pub user_id: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapHealth {
    pub status: &'static str,
    pub service: &'static str,
    pub cached_roadmaps: usize,
    pub uptime: u64,
}

/// Build the provider from the cookie and run generation, timing the call.
async fn generate(
    state: &AppState,
    config: &RequireConfig,
    user_id: &str,
    preferences: Option<RoadmapPreferences>,
    force: bool,
) -> AppResult<Json<ApiResponse<StudyRoadmap>>> {
    let provider = state
        .providers
        .for_user(&config.0)
        .map_err(RoadmapError::from)?;

    let started = Instant::now();
    let generated = state
        .roadmaps
        .generate_roadmap(user_id, provider.as_ref(), preferences, force)
        .await?;

    let meta = Meta::new()
        .cached(generated.cached, generated.expires_at)
        .ai_provider(provider.kind().as_str())
        .generation_time(started.elapsed());

    Ok(Json(ApiResponse::ok_with(generated.roadmap, meta)))
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// GET /api/v1/roadmap/{userId}?regenerate=&timeline=&targetRole=&difficulty=
///
/// Cached roadmap when fresh, otherwise a new one from the user's provider.
pub async fn get_roadmap(
    config: RequireConfig,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<RoadmapQuery>,
) -> AppResult<Json<ApiResponse<StudyRoadmap>>> {
    check_user_id(&user_id)?;
    config.ensure_owner(&user_id, "You can only access your own roadmap")?;

    generate(&state, &config, &user_id, query.preferences(), query.regenerate).await
}

/// POST /api/v1/roadmap/{userId}/regenerate
///
/// Always calls the provider; the body carries optional preferences.
pub async fn regenerate_roadmap(
    config: RequireConfig,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidatedJson(preferences): ValidatedJson<RoadmapPreferences>,
) -> AppResult<Json<ApiResponse<StudyRoadmap>>> {
    check_user_id(&user_id)?;
    config.ensure_owner(&user_id, "You can only regenerate your own roadmap")?;

    let preferences = (!preferences.is_empty()).then_some(preferences);
    generate(&state, &config, &user_id, preferences, true).await
}

// ---------------------------------------------------------------------------
// Cache and service
// ---------------------------------------------------------------------------

/// DELETE /api/v1/roadmap/{userId}/cache
pub async fn clear_cache(
    config: RequireConfig,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<CacheCleared>>> {
    check_user_id(&user_id)?;
    config.ensure_owner(&user_id, "You can only clear your own roadmap cache")?;

    state.roadmaps.clear_cache(Some(&user_id)).await;

    Ok(Json(ApiResponse::ok(CacheCleared {
        user_id,
        message: "Roadmap cache cleared successfully",
    })))
}

/// GET /api/v1/roadmap/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<RoadmapHealth>> {
    Json(ApiResponse::ok(RoadmapHealth {
        status: "healthy",
        service: "roadmap-api",
        cached_roadmaps: state.roadmaps.cached_count().await,
        uptime: state.uptime_secs(),
    }))
}
