//! The progress service: catalog plus lazily generated per-user histories.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::catalog::ProblemCatalog;
use super::search::{search_problems, ProblemFilters};
use super::stats;
use super::store::SubmissionStore;
use super::submissions::{generate_history, NewSubmission};
use super::{
    Difficulty, Goals, LeetCodeProblem, Priority, ProblemRecommendation, ProgressResponse,
    UserSubmission,
};
use crate::error::CoreError;
use crate::types::ProblemId;

/// Default number of recommendations embedded in a progress response.
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

pub struct ProgressService {
    catalog: ProblemCatalog,
    store: Arc<dyn SubmissionStore>,
    // Never held across an `.await`.
    rng: Mutex<StdRng>,
}

impl ProgressService {
    /// Build with an OS-seeded RNG.
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self::from_rng(store, StdRng::from_os_rng())
    }

    /// Build with a fixed seed so catalog and histories are reproducible.
    pub fn with_seed(store: Arc<dyn SubmissionStore>, seed: u64) -> Self {
        Self::from_rng(store, StdRng::seed_from_u64(seed))
    }

    fn from_rng(store: Arc<dyn SubmissionStore>, mut rng: StdRng) -> Self {
        let catalog = ProblemCatalog::generate(&mut rng);
        tracing::info!(problems = catalog.len(), "Problem catalog generated");
        Self {
            catalog,
            store,
            rng: Mutex::new(rng),
        }
    }

    pub fn catalog(&self) -> &ProblemCatalog {
        &self.catalog
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        // A panic mid-draw leaves the RNG perfectly usable.
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The stored history, generating and storing one on first access.
    async fn history(&self, user_id: &str) -> Vec<UserSubmission> {
        if let Some(history) = self.store.get(user_id).await {
            return history;
        }

        let generated = {
            let mut rng = self.rng();
            let solved_count = rng.random_range(50..250);
            generate_history(&self.catalog, solved_count, &mut *rng, Utc::now())
        };
        tracing::debug!(user_id, submissions = generated.len(), "Generated mock submission history");
        self.store.insert_if_absent(user_id, generated).await
    }

    /// Full progress snapshot, recomputed on every call.
    pub async fn get_user_progress(&self, user_id: &str) -> ProgressResponse {
        let history = self.history(user_id).await;
        let now = Utc::now();
        let solved = stats::solved_ids(&history);

        let mut rng = self.rng();
        let streak_info = stats::streak_info(&history, now);
        let overall_stats = stats::overall_stats(&self.catalog, &history, &solved, &streak_info, &mut *rng);
        let topic_progress = stats::topic_progress(&self.catalog, &history, &solved, &mut *rng, now);
        let company_progress = stats::company_progress(&self.catalog, &solved, now);
        let recent_activity = stats::recent_activity(&self.catalog, &history, &mut *rng);
        let weakest_topics = stats::weakest_topics(&self.catalog, &topic_progress);
        let strongest_topics = stats::strongest_topics(&topic_progress);
        let next_recommendations = self.recommend(&solved, DEFAULT_RECOMMENDATIONS, &mut *rng);

        ProgressResponse {
            user_id: user_id.to_string(),
            last_updated: now,
            overall_stats,
            topic_progress,
            company_progress,
            recent_activity,
            weakest_topics,
            strongest_topics,
            next_recommendations,
            streak_info,
            goals: Goals::default(),
        }
    }

    /// Prepend a submission to the user's history.
    pub async fn update_user_progress(&self, user_id: &str, submission: UserSubmission) {
        self.store.prepend(user_id, submission).await;
    }

    /// Validate a client submission against the catalog, assign it an id and
    /// record it.
    pub async fn record_submission(
        &self,
        user_id: &str,
        input: NewSubmission,
    ) -> Result<UserSubmission, CoreError> {
        if self.catalog.get(input.problem_id).is_none() {
            return Err(CoreError::NotFound {
                entity: "Problem",
                id: input.problem_id.to_string(),
            });
        }
        let submission = input.into_submission(&mut *self.rng(), Utc::now());
        tracing::info!(
            user_id,
            problem_id = submission.problem_id,
            submission_id = %submission.submission_id,
            "Recorded submission",
        );
        self.update_user_progress(user_id, submission.clone()).await;
        Ok(submission)
    }

    pub fn get_problems_by_topic(&self, topic: &str, difficulty: Option<Difficulty>) -> Vec<LeetCodeProblem> {
        self.catalog.by_topic(topic, difficulty)
    }

    pub fn get_problems_by_company(&self, company: &str, difficulty: Option<Difficulty>) -> Vec<LeetCodeProblem> {
        self.catalog.by_company(company, difficulty)
    }

    /// Random unsolved problems with a reason and priority. A user with no
    /// stored history gets recommendations from the whole catalog.
    pub async fn get_recommendations(&self, user_id: &str, count: usize) -> Vec<ProblemRecommendation> {
        let solved = self
            .store
            .get(user_id)
            .await
            .map(|history| stats::solved_ids(&history))
            .unwrap_or_default();
        self.recommend(&solved, count, &mut *self.rng())
    }

    pub fn search_problems(&self, query: &str, filters: &ProblemFilters) -> Vec<LeetCodeProblem> {
        search_problems(&self.catalog, query, filters)
    }

    /// Number of users with a stored history.
    pub async fn tracked_users(&self) -> usize {
        self.store.user_count().await
    }

    fn recommend<R: Rng + ?Sized>(
        &self,
        solved: &HashSet<ProblemId>,
        count: usize,
        rng: &mut R,
    ) -> Vec<ProblemRecommendation> {
        let unsolved: Vec<&LeetCodeProblem> = self
            .catalog
            .all()
            .iter()
            .filter(|p| !solved.contains(&p.id))
            .collect();

        unsolved
            .choose_multiple(rng, count.min(unsolved.len()))
            .map(|&problem| ProblemRecommendation {
                problem: problem.clone(),
                reason: recommendation_reason(problem, rng),
                priority: *[Priority::High, Priority::Medium, Priority::Low]
                    .choose(rng)
                    .unwrap_or(&Priority::Medium),
                estimated_difficulty: rng.random_range(1..=10),
                topics: problem.topics.clone(),
                expected_learning: problem
                    .topics
                    .iter()
                    .map(|t| format!("Improve {t} skills"))
                    .collect(),
            })
            .collect()
    }
}

fn recommendation_reason<R: Rng + ?Sized>(problem: &LeetCodeProblem, rng: &mut R) -> String {
    let topic = problem.topics.first().map(String::as_str).unwrap_or("core");
    let company = problem.companies.first().map(String::as_str).unwrap_or("top companies");
    match rng.random_range(0..5) {
        0 => format!("Strengthen your {topic} skills"),
        1 => format!("Popular at {company}"),
        2 => format!("Good practice for {} level problems", problem.difficulty.as_str()),
        3 => format!("High acceptance rate ({}%)", (problem.ac_rate * 100.0).round()),
        _ => "Commonly asked in interviews".to_string(),
    }
}
