//! Pure statistics over a catalog and one user's submission history.
//!
//! Everything here is a function of its inputs; the few mock figures that
//! have no real source (ranking, contest rating, time spent) draw from the
//! RNG passed in.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rand::Rng;

use super::catalog::{ProblemCatalog, COMPANIES, TOPICS};
use super::{
    ratio, CompanyProgress, Difficulty, DifficultyStats, Frequency, LeetCodeProblem, OverallStats,
    RecentActivity, SolvedCount, StreakInfo, TopicProgress, UserSubmission, WeakestTopic,
};
use crate::types::{ProblemId, Timestamp};

/// Topics with this many problems or fewer are ignored when ranking.
const MIN_TOPIC_SIZE: u32 = 5;

/// Problem ids with at least one accepted submission.
pub fn solved_ids(submissions: &[UserSubmission]) -> HashSet<ProblemId> {
    submissions
        .iter()
        .filter(|s| s.status.is_accepted())
        .map(|s| s.problem_id)
        .collect()
}

#[derive(Default)]
struct Tally {
    all: SolvedCount,
    easy: SolvedCount,
    medium: SolvedCount,
    hard: SolvedCount,
}

impl Tally {
    fn add(&mut self, problem: &LeetCodeProblem, solved: bool) {
        self.all.add(solved);
        match problem.difficulty {
            Difficulty::Easy => self.easy.add(solved),
            Difficulty::Medium => self.medium.add(solved),
            Difficulty::Hard => self.hard.add(solved),
        }
    }
}

pub fn difficulty_stats(catalog: &ProblemCatalog, solved: &HashSet<ProblemId>) -> DifficultyStats {
    let mut tally = Tally::default();
    for problem in catalog.all() {
        tally.add(problem, solved.contains(&problem.id));
    }
    DifficultyStats {
        easy: tally.easy.into(),
        medium: tally.medium.into(),
        hard: tally.hard.into(),
    }
}

pub fn overall_stats<R: Rng + ?Sized>(
    catalog: &ProblemCatalog,
    submissions: &[UserSubmission],
    solved: &HashSet<ProblemId>,
    streak: &StreakInfo,
    rng: &mut R,
) -> OverallStats {
    let total_solved = solved.len() as u32;
    let total_problems = catalog.len() as u32;

    let accepted: Vec<&UserSubmission> =
        submissions.iter().filter(|s| s.status.is_accepted()).collect();
    let accuracy_rate = if submissions.is_empty() {
        0.0
    } else {
        accepted.len() as f64 / submissions.len() as f64
    };
    let avg_runtime_ms = if accepted.is_empty() {
        0.0
    } else {
        accepted.iter().map(|s| s.runtime as f64).sum::<f64>() / accepted.len() as f64
    };

    OverallStats {
        total_solved,
        total_problems,
        progress_percentage: ratio(total_solved, total_problems),
        current_streak: streak.current_streak,
        max_streak: streak.max_streak,
        ranking: rng.random_range(1_000..101_000),
        contest_rating: rng.random_range(1_200..2_200),
        difficulty_stats: difficulty_stats(catalog, solved),
        accuracy_rate,
        avg_solve_time: avg_runtime_ms / 1000.0 / 60.0,
    }
}

/// Progress for every known topic, in catalog topic order.
pub fn topic_progress<R: Rng + ?Sized>(
    catalog: &ProblemCatalog,
    submissions: &[UserSubmission],
    solved: &HashSet<ProblemId>,
    rng: &mut R,
    now: Timestamp,
) -> Vec<TopicProgress> {
    let mut tallies: HashMap<&str, Tally> = TOPICS.iter().map(|t| (*t, Tally::default())).collect();
    let mut rate_sums: HashMap<&str, f64> = HashMap::new();
    for problem in catalog.all() {
        let is_solved = solved.contains(&problem.id);
        for topic in &problem.topics {
            if let Some(tally) = tallies.get_mut(topic.as_str()) {
                tally.add(problem, is_solved);
                *rate_sums.entry(topic.as_str()).or_default() += problem.ac_rate;
            }
        }
    }

    let mut recent: HashMap<&str, Vec<UserSubmission>> = HashMap::new();
    for submission in submissions.iter().take(20) {
        let Some(problem) = catalog.get(submission.problem_id) else {
            continue;
        };
        for topic in &problem.topics {
            let list = recent.entry(topic.as_str()).or_default();
            if list.len() < 5 {
                list.push(submission.clone());
            }
        }
    }

    let mut attempts: HashMap<&str, u32> = HashMap::new();
    for submission in submissions {
        if let Some(problem) = catalog.get(submission.problem_id) {
            for topic in &problem.topics {
                *attempts.entry(topic.as_str()).or_default() += 1;
            }
        }
    }

    TOPICS
        .iter()
        .map(|&topic| {
            let tally = tallies.remove(topic).unwrap_or_default();
            let recent_submissions = recent.remove(topic).unwrap_or_default();
            let average_acceptance_rate = if tally.all.total == 0 {
                0.0
            } else {
                rate_sums.get(topic).copied().unwrap_or(0.0) / f64::from(tally.all.total)
            };
            let average_attempts = if tally.all.solved == 0 {
                0.0
            } else {
                f64::from(attempts.get(topic).copied().unwrap_or(0)) / f64::from(tally.all.solved)
            };
            TopicProgress {
                topic_name: topic.to_string(),
                total_problems: tally.all.total,
                solved_problems: tally.all.solved,
                easy_count: tally.easy,
                medium_count: tally.medium,
                hard_count: tally.hard,
                progress_percentage: tally.all.ratio(),
                last_practiced: recent_submissions
                    .first()
                    .map(|s| s.submission_time)
                    .unwrap_or(now),
                average_acceptance_rate,
                recent_submissions,
                average_attempts,
                time_spent: rng.random_range(60..360),
            }
        })
        .collect()
}

pub fn company_frequency(company: &str) -> Frequency {
    match company {
        "Google" | "Amazon" | "Microsoft" | "Apple" | "Facebook" => Frequency::High,
        "Netflix" | "Uber" | "Airbnb" | "LinkedIn" => Frequency::Medium,
        _ => Frequency::Low,
    }
}

/// The ten companies with the most problems, largest first.
pub fn company_progress(
    catalog: &ProblemCatalog,
    solved: &HashSet<ProblemId>,
    now: Timestamp,
) -> Vec<CompanyProgress> {
    let mut tallies: HashMap<&str, Tally> =
        COMPANIES.iter().map(|c| (*c, Tally::default())).collect();
    for problem in catalog.all() {
        let is_solved = solved.contains(&problem.id);
        for company in &problem.companies {
            if let Some(tally) = tallies.get_mut(company.as_str()) {
                tally.add(problem, is_solved);
            }
        }
    }

    let mut progress: Vec<CompanyProgress> = COMPANIES
        .iter()
        .filter_map(|&company| {
            let tally = tallies.remove(company)?;
            (tally.all.total > 0).then(|| CompanyProgress {
                company_name: company.to_string(),
                total_problems: tally.all.total,
                solved_problems: tally.all.solved,
                easy_count: tally.easy,
                medium_count: tally.medium,
                hard_count: tally.hard,
                progress_percentage: tally.all.ratio(),
                last_practiced: now,
                frequency: company_frequency(company),
            })
        })
        .collect();

    // Stable sort keeps catalog order among ties.
    progress.sort_by(|a, b| b.total_problems.cmp(&a.total_problems));
    progress.truncate(10);
    progress
}

/// The newest 30 submissions grouped by UTC day, newest day first, at most
/// 14 days.
pub fn recent_activity<R: Rng + ?Sized>(
    catalog: &ProblemCatalog,
    submissions: &[UserSubmission],
    rng: &mut R,
) -> Vec<RecentActivity> {
    let mut days: BTreeMap<NaiveDate, RecentActivity> = BTreeMap::new();

    for submission in submissions.iter().take(30) {
        let date = submission.submission_time.date_naive();
        let activity = days.entry(date).or_insert_with(|| RecentActivity {
            date,
            problems_solved: 0,
            time_spent: 0,
            topics: Vec::new(),
            submissions: Vec::new(),
            achievements: Vec::new(),
        });

        activity.submissions.push(submission.clone());
        if submission.status.is_accepted() {
            activity.problems_solved += 1;
        }
        activity.time_spent += rng.random_range(15..60);

        if let Some(problem) = catalog.get(submission.problem_id) {
            for topic in &problem.topics {
                if !activity.topics.contains(topic) {
                    activity.topics.push(topic.clone());
                }
            }
        }
    }

    days.into_values().rev().take(14).collect()
}

/// Scan unique accepted days, newest first.
///
/// `max_streak` is the longest run of consecutive days anywhere in the
/// history. `current_streak` is the run that starts at the newest day, and
/// only counts when that day is today or yesterday.
pub fn streak_info(submissions: &[UserSubmission], now: Timestamp) -> StreakInfo {
    let mut accepted: Vec<&UserSubmission> =
        submissions.iter().filter(|s| s.status.is_accepted()).collect();
    accepted.sort_by(|a, b| b.submission_time.cmp(&a.submission_time));

    let mut dates: Vec<NaiveDate> = Vec::new();
    for s in &accepted {
        let day = s.submission_time.date_naive();
        if dates.last() != Some(&day) {
            dates.push(day);
        }
    }

    let today = now.date_naive();
    let mut max_streak = 0u32;
    let mut run = 0u32;
    let mut leading_run = 0u32;
    let mut in_leading_run = true;

    for (i, date) in dates.iter().enumerate() {
        let continues = i > 0 && (dates[i - 1] - *date).num_days() == 1;
        if continues {
            run += 1;
        } else {
            if i > 0 {
                in_leading_run = false;
            }
            run = 1;
        }
        if in_leading_run {
            leading_run = run;
        }
        max_streak = max_streak.max(run);
    }

    let newest_is_recent = dates
        .first()
        .is_some_and(|d| (today - *d).num_days() <= 1);
    let current_streak = if newest_is_recent { leading_run } else { 0 };

    StreakInfo {
        current_streak,
        max_streak,
        streak_dates: dates.iter().take(current_streak as usize).copied().collect(),
        last_solved_date: accepted.first().map(|s| s.submission_time).unwrap_or(now),
    }
}

fn ranked_topics(topics: &[TopicProgress]) -> Vec<&TopicProgress> {
    topics
        .iter()
        .filter(|t| t.total_problems > MIN_TOPIC_SIZE)
        .collect()
}

/// Three least-progressed topics, each with easy warm-ups and a suggested
/// order (hardest-accepted first).
pub fn weakest_topics(catalog: &ProblemCatalog, topics: &[TopicProgress]) -> Vec<WeakestTopic> {
    let mut ranked = ranked_topics(topics);
    ranked.sort_by(|a, b| a.progress_percentage.total_cmp(&b.progress_percentage));

    ranked
        .into_iter()
        .take(3)
        .map(|topic| {
            let name = topic.topic_name.as_str();
            let problems_to_improve = catalog
                .all()
                .iter()
                .filter(|p| p.has_topic(name) && p.difficulty == Difficulty::Easy)
                .take(5)
                .cloned()
                .collect();

            let mut in_topic: Vec<&LeetCodeProblem> =
                catalog.all().iter().filter(|p| p.has_topic(name)).collect();
            in_topic.sort_by(|a, b| a.ac_rate.total_cmp(&b.ac_rate));

            WeakestTopic {
                topic_name: topic.topic_name.clone(),
                progress_percentage: topic.progress_percentage,
                problems_to_improve,
                suggested_order: in_topic.iter().take(10).map(|p| p.id).collect(),
            }
        })
        .collect()
}

/// Names of the five most-progressed topics.
pub fn strongest_topics(topics: &[TopicProgress]) -> Vec<String> {
    let mut ranked = ranked_topics(topics);
    ranked.sort_by(|a, b| b.progress_percentage.total_cmp(&a.progress_percentage));
    ranked
        .into_iter()
        .take(5)
        .map(|t| t.topic_name.clone())
        .collect()
}
