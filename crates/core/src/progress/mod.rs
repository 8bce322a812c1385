//! Mock LeetCode-style progress data.
//!
//! A fixed problem catalog is generated once at startup; per-user submission
//! histories are synthesised lazily on first access and kept in an injected
//! [`store::SubmissionStore`]. Statistics are recomputed on every request.

pub mod catalog;
pub mod search;
pub mod service;
pub mod stats;
pub mod store;
pub mod submissions;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ProblemId, Timestamp};

pub use catalog::ProblemCatalog;
pub use search::ProblemFilters;
pub use service::ProgressService;
pub use store::{InMemorySubmissionStore, SubmissionStore};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Exact-case parse, matching the wire format.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Easy" => Some(Self::Easy),
            "Medium" => Some(Self::Medium),
            "Hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Accepted,
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
    #[serde(rename = "Time Limit Exceeded")]
    TimeLimitExceeded,
    #[serde(rename = "Memory Limit Exceeded")]
    MemoryLimitExceeded,
    #[serde(rename = "Runtime Error")]
    RuntimeError,
    #[serde(rename = "Compile Error")]
    CompileError,
}

impl SubmissionStatus {
    /// Statuses used for synthesised failed attempts.
    pub const FAILURES: [SubmissionStatus; 4] = [
        Self::WrongAnswer,
        Self::TimeLimitExceeded,
        Self::MemoryLimitExceeded,
        Self::RuntimeError,
    ];

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// How often a company asks questions from the catalog.
pub type Frequency = Priority;

// ---------------------------------------------------------------------------
// Catalog and submissions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeProblem {
    pub id: ProblemId,
    pub title: String,
    pub slug: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
    pub companies: Vec<String>,
    pub is_paid: bool,
    /// Acceptance rate in `[0, 1]`.
    pub ac_rate: f64,
    pub url: String,
    pub hints: Vec<String>,
    pub similar: Vec<ProblemId>,
}

impl LeetCodeProblem {
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    pub fn has_company(&self, company: &str) -> bool {
        self.companies.iter().any(|c| c == company)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubmission {
    pub problem_id: ProblemId,
    pub status: SubmissionStatus,
    /// Milliseconds.
    pub runtime: u64,
    /// Megabytes.
    pub memory: f64,
    pub submission_time: Timestamp,
    pub language: String,
    pub submission_id: String,
    pub runtime_percentile: f64,
    pub memory_percentile: f64,
}

// ---------------------------------------------------------------------------
// Computed progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SolvedCount {
    pub solved: u32,
    pub total: u32,
}

impl SolvedCount {
    pub fn add(&mut self, solved: bool) {
        self.total += 1;
        if solved {
            self.solved += 1;
        }
    }

    pub fn ratio(&self) -> f64 {
        ratio(self.solved, self.total)
    }
}

/// `solved / total`, or 0 when there is nothing to solve.
pub fn ratio(solved: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(solved) / f64::from(total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyBreakdown {
    pub solved: u32,
    pub total: u32,
    pub percentage: f64,
}

impl From<SolvedCount> for DifficultyBreakdown {
    fn from(count: SolvedCount) -> Self {
        Self {
            solved: count.solved,
            total: count.total,
            percentage: count.ratio(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyStats {
    pub easy: DifficultyBreakdown,
    pub medium: DifficultyBreakdown,
    pub hard: DifficultyBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_solved: u32,
    pub total_problems: u32,
    pub progress_percentage: f64,
    pub current_streak: u32,
    pub max_streak: u32,
    pub ranking: u32,
    pub contest_rating: u32,
    pub difficulty_stats: DifficultyStats,
    /// Accepted submissions over all submissions.
    pub accuracy_rate: f64,
    /// Mean accepted runtime, in minutes.
    pub avg_solve_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub topic_name: String,
    pub total_problems: u32,
    pub solved_problems: u32,
    pub easy_count: SolvedCount,
    pub medium_count: SolvedCount,
    pub hard_count: SolvedCount,
    pub progress_percentage: f64,
    pub last_practiced: Timestamp,
    pub average_acceptance_rate: f64,
    pub recent_submissions: Vec<UserSubmission>,
    pub average_attempts: f64,
    /// Minutes.
    pub time_spent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProgress {
    pub company_name: String,
    pub total_problems: u32,
    pub solved_problems: u32,
    pub easy_count: SolvedCount,
    pub medium_count: SolvedCount,
    pub hard_count: SolvedCount,
    pub progress_percentage: f64,
    pub last_practiced: Timestamp,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub date: NaiveDate,
    pub problems_solved: u32,
    /// Minutes.
    pub time_spent: u32,
    pub topics: Vec<String>,
    pub submissions: Vec<UserSubmission>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakInfo {
    pub current_streak: u32,
    pub max_streak: u32,
    pub streak_dates: Vec<NaiveDate>,
    pub last_solved_date: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakestTopic {
    pub topic_name: String,
    pub progress_percentage: f64,
    pub problems_to_improve: Vec<LeetCodeProblem>,
    pub suggested_order: Vec<ProblemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecommendation {
    pub problem: LeetCodeProblem,
    pub reason: String,
    pub priority: Priority,
    /// 1-10 relative to the user's level.
    pub estimated_difficulty: u8,
    pub topics: Vec<String>,
    pub expected_learning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    pub daily_target: u32,
    pub weekly_target: u32,
    pub target_topics: Vec<String>,
    pub target_companies: Vec<String>,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            daily_target: 2,
            weekly_target: 10,
            target_topics: vec!["Dynamic Programming".into(), "Graph".into()],
            target_companies: vec!["Google".into(), "Amazon".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub user_id: String,
    pub last_updated: Timestamp,
    pub overall_stats: OverallStats,
    pub topic_progress: Vec<TopicProgress>,
    pub company_progress: Vec<CompanyProgress>,
    pub recent_activity: Vec<RecentActivity>,
    pub weakest_topics: Vec<WeakestTopic>,
    pub strongest_topics: Vec<String>,
    pub next_recommendations: Vec<ProblemRecommendation>,
    pub streak_info: StreakInfo,
    pub goals: Goals,
}
