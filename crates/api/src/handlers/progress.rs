//! Handlers for the progress API (`/api/v1/progress`).

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, ETAG};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use prep_core::error::CoreError;
use prep_core::progress::service::DEFAULT_RECOMMENDATIONS;
use prep_core::progress::submissions::NewSubmission;
use prep_core::progress::{Difficulty, ProblemFilters};
use prep_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::config_cookie::RequireConfig;
use crate::response::{ApiResponse, API_VERSION};
use crate::state::AppState;

use super::check_user_id;

const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Deserialize, Validate)]
pub struct DifficultyQuery {
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendationQuery {
    #[validate(range(min = 1, max = 50, message = "Count must be between 1 and 50"))]
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 100, message = "Search query must be 1-100 characters"))]
    pub q: String,
    /// Comma-separated difficulties.
    pub difficulty: Option<String>,
    /// Comma-separated topic names.
    pub topics: Option<String>,
    /// Comma-separated company names.
    pub companies: Option<String>,
    pub is_paid: Option<bool>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_acceptance_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_acceptance_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub submission_id: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub status: &'static str,
    pub service: &'static str,
    pub uptime: u64,
    pub timestamp: Timestamp,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetrics {
    pub service: &'static str,
    pub status: &'static str,
    pub tracked_users: usize,
    pub catalog_size: usize,
    pub uptime_secs: u64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_difficulty(raw: &str) -> Result<Difficulty, AppError> {
    Difficulty::parse(raw.trim()).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Invalid difficulty '{raw}'. Must be one of: Easy, Medium, Hard"
        )))
    })
}

fn optional_difficulty(raw: Option<&str>) -> Result<Option<Difficulty>, AppError> {
    raw.filter(|s| !s.is_empty()).map(parse_difficulty).transpose()
}

fn comma_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

fn check_name(kind: &str, name: &str) -> Result<(), AppError> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{kind} name must be 1-{MAX_NAME_LEN} characters"
        ))));
    }
    Ok(())
}

/// Quoted strong ETag over the serialized payload. `None` when the value
/// does not serialize.
fn content_etag<T: Serialize>(value: &T) -> Option<String> {
    let bytes = serde_json::to_vec(value)
        .inspect_err(|e| tracing::warn!(error = %e, "Skipping ETag for unserializable payload"))
        .ok()?;
    let digest = Sha256::digest(&bytes);
    let hex: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
    Some(format!("\"{hex}\""))
}

/// JSON response with caching headers. The ETag is omitted when absent.
fn cacheable<T: Serialize>(body: T, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Json(body).into_response();
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache_control));
    if let Some(value) = etag.and_then(|e| HeaderValue::from_str(e).ok()) {
        headers.insert(ETAG, value);
    }
    response
}

// ---------------------------------------------------------------------------
// User progress
// ---------------------------------------------------------------------------

/// GET /api/v1/progress/{userId}
///
/// Full progress report for the cookie owner.
pub async fn get_progress(
    config: RequireConfig,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Response> {
    check_user_id(&user_id)?;
    config.ensure_owner(&user_id, "You can only access your own progress data")?;

    let progress = state.progress.get_user_progress(&user_id).await;
    tracing::debug!(
        user_id = %user_id,
        solved = progress.overall_stats.total_solved,
        "Progress report computed",
    );

    let etag = content_etag(&progress);
    Ok(cacheable(
        ApiResponse::ok(progress),
        "private, max-age=300",
        etag.as_deref(),
    ))
}

/// POST /api/v1/progress/{userId}/submissions
pub async fn record_submission(
    config: RequireConfig,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidatedJson(input): ValidatedJson<NewSubmission>,
) -> AppResult<impl IntoResponse> {
    check_user_id(&user_id)?;
    config.ensure_owner(&user_id, "You can only record your own submissions")?;

    let submission = state.progress.record_submission(&user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(SubmissionReceipt {
            submission_id: submission.submission_id,
            message: "Submission recorded successfully",
        })),
    ))
}

/// GET /api/v1/progress/{userId}/recommendations?count=
pub async fn get_recommendations(
    config: RequireConfig,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<RecommendationQuery>,
) -> AppResult<Response> {
    check_user_id(&user_id)?;
    config.ensure_owner(&user_id, "You can only access your own recommendations")?;

    let count = query
        .count
        .map_or(DEFAULT_RECOMMENDATIONS, |c| c as usize);
    let recommendations = state.progress.get_recommendations(&user_id, count).await;

    Ok(cacheable(
        ApiResponse::ok(recommendations),
        "private, max-age=600",
        Some(format!("\"rec-{user_id}-{count}\"").as_str()),
    ))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /api/v1/progress/problems/topic/{topic}?difficulty=
pub async fn problems_by_topic(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    ValidatedQuery(query): ValidatedQuery<DifficultyQuery>,
) -> AppResult<Response> {
    check_name("Topic", &topic)?;
    let difficulty = optional_difficulty(query.difficulty.as_deref())?;

    let problems = state.progress.get_problems_by_topic(&topic, difficulty);
    let tag = difficulty.map_or("all", |d| d.as_str());

    Ok(cacheable(
        ApiResponse::ok(problems),
        "public, max-age=3600",
        Some(format!("\"topic-{topic}-{tag}\"").as_str()),
    ))
}

/// GET /api/v1/progress/problems/company/{company}?difficulty=
pub async fn problems_by_company(
    State(state): State<AppState>,
    Path(company): Path<String>,
    ValidatedQuery(query): ValidatedQuery<DifficultyQuery>,
) -> AppResult<Response> {
    check_name("Company", &company)?;
    let difficulty = optional_difficulty(query.difficulty.as_deref())?;

    let problems = state.progress.get_problems_by_company(&company, difficulty);
    let tag = difficulty.map_or("all", |d| d.as_str());

    Ok(cacheable(
        ApiResponse::ok(problems),
        "public, max-age=3600",
        Some(format!("\"company-{company}-{tag}\"").as_str()),
    ))
}

/// GET /api/v1/progress/problems/search?q=&difficulty=&topics=&companies=&isPaid=&minAcceptanceRate=&maxAcceptanceRate=
pub async fn search_problems(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> AppResult<Response> {
    let difficulty = comma_list(query.difficulty.as_deref())
        .iter()
        .map(|d| parse_difficulty(d))
        .collect::<Result<Vec<_>, _>>()?;

    let filters = ProblemFilters {
        difficulty,
        topics: comma_list(query.topics.as_deref()),
        companies: comma_list(query.companies.as_deref()),
        is_paid: query.is_paid,
        min_acceptance_rate: query.min_acceptance_rate,
        max_acceptance_rate: query.max_acceptance_rate,
    };

    let results = state.progress.search_problems(&query.q, &filters);
    tracing::debug!(query = %query.q, hits = results.len(), "Problem search");

    let etag = content_etag(&results);
    Ok(cacheable(
        ApiResponse::ok(results),
        "public, max-age=1800",
        etag.as_deref(),
    ))
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// GET /api/v1/progress/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<ServiceHealth>> {
    Json(ApiResponse::ok(ServiceHealth {
        status: "healthy",
        service: "progress-api",
        uptime: state.uptime_secs(),
        timestamp: Utc::now(),
        version: API_VERSION,
    }))
}

/// GET /api/v1/progress/metrics
pub async fn metrics(
    _config: RequireConfig,
    State(state): State<AppState>,
) -> Json<ApiResponse<ServiceMetrics>> {
    Json(ApiResponse::ok(ServiceMetrics {
        service: "progress-api",
        status: "operational",
        tracked_users: state.progress.tracked_users().await,
        catalog_size: state.progress.catalog().len(),
        uptime_secs: state.uptime_secs(),
    }))
}
