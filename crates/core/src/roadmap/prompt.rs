//! Prompt construction for roadmap generation.

use chrono::NaiveDate;
use serde::Serialize;

use super::RoadmapPreferences;
use crate::progress::{DifficultyStats, ProgressResponse};
use crate::types::Timestamp;

/// Topics at or above this progress are not called out as weak.
const WEAK_TOPIC_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// Classify by solved count and share of hard problems solved.
    pub fn assess(solved: u32, hard_percentage: f64) -> Self {
        if solved < 50 {
            Self::Beginner
        } else if solved < 150 || hard_percentage < 0.1 {
            Self::Intermediate
        } else if solved < 300 || hard_percentage < 0.3 {
            Self::Advanced
        } else {
            Self::Expert
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopicSnapshot {
    pub topic_name: String,
    pub progress_percentage: f64,
    pub solved_problems: u32,
    pub total_problems: u32,
    pub last_practiced: Timestamp,
}

#[derive(Debug, Clone)]
pub struct ActivitySnapshot {
    pub date: NaiveDate,
    pub problems_solved: u32,
    pub topics: Vec<String>,
}

/// The slice of a progress snapshot that feeds the prompt.
#[derive(Debug, Clone)]
pub struct RoadmapContext {
    pub user_id: String,
    pub total_problems: u32,
    pub solved_problems: u32,
    pub progress_percentage: f64,
    pub topics: Vec<TopicSnapshot>,
    pub difficulty_stats: DifficultyStats,
    pub recent_activity: Vec<ActivitySnapshot>,
    pub current_streak: u32,
    /// Minutes.
    pub avg_solve_time: f64,
    pub preferences: Option<RoadmapPreferences>,
}

impl RoadmapContext {
    pub fn from_progress(progress: &ProgressResponse, preferences: Option<RoadmapPreferences>) -> Self {
        let stats = &progress.overall_stats;
        Self {
            user_id: progress.user_id.clone(),
            total_problems: stats.total_problems,
            solved_problems: stats.total_solved,
            progress_percentage: stats.progress_percentage,
            topics: progress
                .topic_progress
                .iter()
                .map(|t| TopicSnapshot {
                    topic_name: t.topic_name.clone(),
                    progress_percentage: t.progress_percentage,
                    solved_problems: t.solved_problems,
                    total_problems: t.total_problems,
                    last_practiced: t.last_practiced,
                })
                .collect(),
            difficulty_stats: stats.difficulty_stats,
            recent_activity: progress
                .recent_activity
                .iter()
                .map(|a| ActivitySnapshot {
                    date: a.date,
                    problems_solved: a.problems_solved,
                    topics: a.topics.clone(),
                })
                .collect(),
            current_streak: progress.streak_info.current_streak,
            avg_solve_time: stats.avg_solve_time,
            preferences: preferences.filter(|p| !p.is_empty()),
        }
    }

    pub fn skill_level(&self) -> SkillLevel {
        SkillLevel::assess(self.solved_problems, self.difficulty_stats.hard.percentage)
    }

    /// Up to five topics below 70%, weakest first.
    pub fn weakest_topics(&self) -> Vec<&TopicSnapshot> {
        let mut weak: Vec<&TopicSnapshot> = self
            .topics
            .iter()
            .filter(|t| t.progress_percentage < WEAK_TOPIC_THRESHOLD)
            .collect();
        weak.sort_by(|a, b| a.progress_percentage.total_cmp(&b.progress_percentage));
        weak.truncate(5);
        weak
    }
}

pub const SYSTEM_PROMPT: &str = r#"You are an expert coding interview preparation coach with deep knowledge of algorithms, data structures, and technical interview best practices. Your task is to analyze a user's LeetCode-style progress data and create a highly personalized, actionable study roadmap.

Key Principles:
1. Focus on the most impactful improvements for interview success
2. Balance addressing weaknesses with reinforcing strengths
3. Consider recency of practice and learning curves
4. Provide specific, actionable recommendations
5. Account for different skill levels and timelines

Response Format: You must respond with valid JSON matching this exact schema:
{
  "userId": "string",
  "generatedAt": "string (ISO date)",
  "nextFocusArea": {
    "topic": "string",
    "reason": "string (detailed explanation)",
    "priority": "high|medium|low",
    "estimatedTimeToImprove": "string (e.g., '1-2 weeks')"
  },
  "recommendedProblems": [
    {
      "problemId": number,
      "title": "string",
      "difficulty": "Easy|Medium|Hard",
      "topic": "string",
      "reason": "string (why this specific problem)",
      "order": number
    }
  ],
  "studyPlan": {
    "weeklyGoals": ["string array of specific goals"],
    "dailyTimeRecommendation": number (minutes),
    "focusAreas": ["string array of topics to focus on"]
  },
  "weakestTopics": [
    {
      "topic": "string",
      "currentProgress": number (0-100),
      "targetProgress": number (0-100),
      "actionItems": ["string array of specific actions"]
    }
  ],
  "overallRecommendation": {
    "skillLevel": "beginner|intermediate|advanced|expert",
    "readinessScore": number (0-100),
    "keyStrengths": ["string array"],
    "criticalGaps": ["string array"],
    "timelineEstimate": "string"
  }
}"#;

#[derive(Debug, Clone)]
pub struct RoadmapPrompt {
    pub system: String,
    pub user: String,
}

pub fn build_prompt(context: &RoadmapContext, now: Timestamp) -> RoadmapPrompt {
    RoadmapPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: build_user_prompt(context, now),
    }
}

fn pct(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

pub fn build_user_prompt(context: &RoadmapContext, now: Timestamp) -> String {
    let d = &context.difficulty_stats;
    let mut out = String::with_capacity(2048);

    out.push_str(
        "Please analyze this user's coding interview preparation progress and create a personalized roadmap.\n\n",
    );
    out.push_str("USER PROGRESS ANALYSIS:\n");
    out.push_str(&format!(
        "- Total Progress: {}/{} problems ({}%)\n",
        context.solved_problems,
        context.total_problems,
        pct(context.progress_percentage)
    ));
    out.push_str(&format!("- Current Skill Level: {}\n", context.skill_level().as_str()));
    out.push_str(&format!("- Current Streak: {} days\n", context.current_streak));
    out.push_str(&format!(
        "- Average Solve Time: {} minutes\n\n",
        context.avg_solve_time.round() as i64
    ));

    out.push_str("DIFFICULTY BREAKDOWN:\n");
    for (label, b) in [("Easy", d.easy), ("Medium", d.medium), ("Hard", d.hard)] {
        out.push_str(&format!(
            "- {label}: {}/{} ({}%)\n",
            b.solved,
            b.total,
            pct(b.percentage)
        ));
    }

    out.push_str("\nTOPIC PERFORMANCE (weakest areas):\n");
    for topic in context.weakest_topics() {
        out.push_str(&format!(
            "- {}: {}% ({}/{}) - Last practiced: {}\n",
            topic.topic_name,
            pct(topic.progress_percentage),
            topic.solved_problems,
            topic.total_problems,
            format_last_practiced(topic.last_practiced, now)
        ));
    }

    out.push_str("\nRECENT ACTIVITY PATTERN:\n");
    out.push_str(&analyze_recent_activity(&context.recent_activity));
    out.push('\n');

    out.push_str("\nREADINESS INDICATORS:\n");
    for factor in readiness_factors(context) {
        out.push_str(&format!("- {factor}\n"));
    }

    out.push_str("\nUSER PREFERENCES:\n");
    match &context.preferences {
        Some(prefs) => {
            let focus = prefs
                .focus_areas
                .as_ref()
                .filter(|areas| !areas.is_empty())
                .map(|areas| areas.join(", "))
                .unwrap_or_else(|| "None specified".to_string());
            out.push_str(&format!(
                "- Target Role: {}\n",
                prefs.target_role.as_deref().unwrap_or("Software Engineer")
            ));
            out.push_str(&format!(
                "- Interview Timeline: {}\n",
                prefs.timeline_to_interview.as_deref().unwrap_or("Not specified")
            ));
            out.push_str(&format!(
                "- Preferred Difficulty: {}\n",
                prefs.preferred_difficulty.map_or("gradual", |d| d.as_str())
            ));
            out.push_str(&format!("- Focus Areas: {focus}\n"));
        }
        None => out.push_str("No specific preferences provided\n"),
    }

    out.push_str(
        "\nREQUIREMENTS:\n\
         1. Identify the single most important focus area for maximum impact\n\
         2. Recommend 5-8 specific problems in order of priority\n\
         3. Create a realistic weekly study plan\n\
         4. Provide actionable steps for the 3-4 weakest topics\n\
         5. Give an honest assessment of interview readiness and timeline\n\n\
         Focus on practical, achievable goals that build momentum and confidence while addressing critical gaps.",
    );
    out
}

/// Consistency summary over the recent-activity window.
pub fn analyze_recent_activity(activity: &[ActivitySnapshot]) -> String {
    if activity.is_empty() {
        return "No recent activity detected - consistency is crucial for interview prep.".to_string();
    }

    let days = activity.len() as f64;
    let solved: u32 = activity.iter().map(|a| a.problems_solved).sum();
    let active_days = activity.iter().filter(|a| a.problems_solved > 0).count() as f64;
    let consistency = active_days / days;

    let verdict = if consistency > 0.8 {
        "Excellent consistency!"
    } else if consistency > 0.5 {
        "Good consistency, but room for improvement."
    } else {
        "Inconsistent practice - this is a key area to improve."
    };

    format!(
        "Average {:.1} problems/day over {} days. {verdict}",
        f64::from(solved) / days,
        activity.len()
    )
}

pub fn readiness_factors(context: &RoadmapContext) -> Vec<&'static str> {
    let d = &context.difficulty_stats;
    let mut factors = Vec::with_capacity(4);

    factors.push(if d.easy.percentage > 0.8 {
        "Strong foundation in easy problems ✓"
    } else {
        "Need to strengthen fundamentals (easy problems)"
    });

    factors.push(if d.medium.percentage > 0.6 {
        "Good progress on medium difficulty ✓"
    } else {
        "Medium problems need significant work"
    });

    factors.push(match context.current_streak {
        s if s > 7 => "Excellent practice consistency ✓",
        s if s > 3 => "Good practice momentum",
        _ => "Need to build consistent practice habit",
    });

    factors.push(if context.avg_solve_time < 30.0 {
        "Efficient problem-solving speed ✓"
    } else {
        "Could improve problem-solving speed"
    });

    factors
}

/// Relative age: `5h ago`, `yesterday`, `3d ago`, `2w ago`, `4mo ago`.
pub fn format_last_practiced(then: Timestamp, now: Timestamp) -> String {
    let hours = (now - then).num_hours().max(0);
    if hours < 24 {
        return format!("{hours}h ago");
    }
    if hours < 48 {
        return "yesterday".to_string();
    }
    let days = hours / 24;
    if days < 7 {
        format!("{days}d ago")
    } else if days < 30 {
        format!("{}w ago", days / 7)
    } else {
        format!("{}mo ago", days / 30)
    }
}
