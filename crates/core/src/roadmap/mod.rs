//! AI study roadmaps: the document shape, prompt construction, response
//! parsing and the per-user cache.
//!
//! The generation flow itself (fetch progress, call the provider, cache)
//! lives in the API crate's engine, which owns the provider handle.

pub mod cache;
mod lenient;
pub mod parse;
pub mod prompt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{ProblemId, Timestamp};

pub use cache::{InMemoryRoadmapCache, RoadmapCache};
pub use parse::{parse_roadmap, RoadmapParseError};
pub use prompt::{build_prompt, RoadmapContext, RoadmapPrompt, SkillLevel};

/// Version stamped on every cached roadmap.
pub const ROADMAP_VERSION: &str = "1.0";

/// Default lifetime of a cached roadmap.
pub const DEFAULT_CACHE_TTL_MINS: i64 = 120;

// ---------------------------------------------------------------------------
// Roadmap document
// ---------------------------------------------------------------------------

// Enum-like fields (priority, difficulty, skill level) stay strings: they are
// model output and are passed through to the client as written. Nested
// fields are all optional and loosely typed; only the top-level keys are
// checked by the parser.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRoadmap {
    pub user_id: String,
    pub generated_at: Timestamp,
    pub next_focus_area: NextFocusArea,
    pub recommended_problems: Vec<RecommendedProblem>,
    pub study_plan: StudyPlan,
    pub weakest_topics: Vec<RoadmapTopic>,
    pub overall_recommendation: OverallRecommendation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NextFocusArea {
    #[serde(deserialize_with = "lenient::string")]
    pub topic: String,
    #[serde(deserialize_with = "lenient::string")]
    pub reason: String,
    #[serde(deserialize_with = "lenient::string")]
    pub priority: String,
    #[serde(deserialize_with = "lenient::string")]
    pub estimated_time_to_improve: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendedProblem {
    pub problem_id: ProblemId,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub difficulty: String,
    #[serde(deserialize_with = "lenient::string")]
    pub topic: String,
    #[serde(deserialize_with = "lenient::string")]
    pub reason: String,
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyPlan {
    #[serde(deserialize_with = "lenient::strings")]
    pub weekly_goals: Vec<String>,
    /// Minutes per day.
    #[serde(deserialize_with = "lenient::number")]
    pub daily_time_recommendation: f64,
    #[serde(deserialize_with = "lenient::strings")]
    pub focus_areas: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoadmapTopic {
    #[serde(deserialize_with = "lenient::string")]
    pub topic: String,
    /// 0-100.
    #[serde(deserialize_with = "lenient::number")]
    pub current_progress: f64,
    /// 0-100.
    #[serde(deserialize_with = "lenient::number")]
    pub target_progress: f64,
    #[serde(deserialize_with = "lenient::strings")]
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverallRecommendation {
    #[serde(deserialize_with = "lenient::string")]
    pub skill_level: String,
    /// 0-100 interview readiness.
    #[serde(deserialize_with = "lenient::number")]
    pub readiness_score: f64,
    #[serde(deserialize_with = "lenient::strings")]
    pub key_strengths: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub critical_gaps: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub timeline_estimate: String,
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredDifficulty {
    Gradual,
    Challenging,
}

impl PreferredDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gradual => "gradual",
            Self::Challenging => "challenging",
        }
    }
}

/// Optional steering supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPreferences {
    #[validate(length(max = 100))]
    pub target_role: Option<String>,
    #[validate(length(max = 100))]
    pub timeline_to_interview: Option<String>,
    pub preferred_difficulty: Option<PreferredDifficulty>,
    #[validate(length(max = 20))]
    pub focus_areas: Option<Vec<String>>,
}

impl RoadmapPreferences {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ---------------------------------------------------------------------------
// Cache entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRoadmap {
    pub roadmap: StudyRoadmap,
    pub generated_at: Timestamp,
    pub expires_at: Timestamp,
    pub version: &'static str,
}

impl CachedRoadmap {
    pub fn new(roadmap: StudyRoadmap, now: Timestamp, ttl: Duration) -> Self {
        Self {
            roadmap,
            generated_at: now,
            expires_at: now + ttl,
            version: ROADMAP_VERSION,
        }
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}
