//! Synthesised submission histories and the user-submitted record shape.

use chrono::Duration;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Deserialize;
use validator::Validate;

use super::catalog::{ProblemCatalog, LANGUAGES};
use super::{Difficulty, SubmissionStatus, UserSubmission};
use crate::types::{ProblemId, Timestamp};

/// How far back synthesised submissions reach.
const HISTORY_DAYS: i64 = 90;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `sub_{unix_millis}_{9 random base-36 chars}`.
pub fn new_submission_id<R: Rng + ?Sized>(rng: &mut R, now: Timestamp) -> String {
    let suffix: String = (0..9)
        .map(|_| char::from(*ID_ALPHABET.choose(rng).unwrap_or(&b'0')))
        .collect();
    format!("sub_{}_{suffix}", now.timestamp_millis())
}

fn runtime_for<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> u64 {
    let base: u64 = match difficulty {
        Difficulty::Easy => 50,
        Difficulty::Medium => 100,
        Difficulty::Hard => 200,
    };
    rng.random_range(base..base * 2)
}

/// Build a plausible history: `solved_count` distinct problems, each with
/// one to three attempts where only the last is accepted. Newest first.
pub fn generate_history<R: Rng + ?Sized>(
    catalog: &ProblemCatalog,
    solved_count: usize,
    rng: &mut R,
    now: Timestamp,
) -> Vec<UserSubmission> {
    let solved: Vec<(ProblemId, Difficulty)> = catalog
        .all()
        .choose_multiple(rng, solved_count.min(catalog.len()))
        .map(|p| (p.id, p.difficulty))
        .collect();

    let mut history = Vec::with_capacity(solved.len() * 2);
    for (problem_id, difficulty) in solved {
        let attempts = rng.random_range(1..=3);
        for attempt in 0..attempts {
            let status = if attempt == attempts - 1 {
                SubmissionStatus::Accepted
            } else {
                *SubmissionStatus::FAILURES
                    .choose(rng)
                    .unwrap_or(&SubmissionStatus::WrongAnswer)
            };
            let days_ago = rng.random_range(0..HISTORY_DAYS);
            history.push(UserSubmission {
                problem_id,
                status,
                runtime: runtime_for(difficulty, rng),
                memory: f64::from(rng.random_range(10u32..30)),
                submission_time: now - Duration::days(days_ago),
                language: LANGUAGES.choose(rng).copied().unwrap_or("Python").to_string(),
                submission_id: new_submission_id(rng, now),
                runtime_percentile: rng.random(),
                memory_percentile: rng.random(),
            });
        }
    }

    history.sort_by(|a, b| b.submission_time.cmp(&a.submission_time));
    history
}

/// Submission body accepted from clients.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    #[validate(range(min = 1, message = "Valid problem ID required"))]
    pub problem_id: ProblemId,
    pub status: SubmissionStatus,
    #[validate(range(min = 0, message = "Runtime must be a non-negative integer"))]
    pub runtime: i64,
    #[validate(range(min = 0.0, message = "Memory must be a non-negative number"))]
    pub memory: f64,
    #[validate(length(min = 1, max = 50, message = "Valid language required"))]
    pub language: String,
    pub submission_time: Timestamp,
}

impl NewSubmission {
    /// Assign an id and mock percentiles.
    pub fn into_submission<R: Rng + ?Sized>(self, rng: &mut R, now: Timestamp) -> UserSubmission {
        UserSubmission {
            problem_id: self.problem_id,
            status: self.status,
            runtime: u64::try_from(self.runtime).unwrap_or(0),
            memory: self.memory,
            submission_time: self.submission_time,
            language: self.language,
            submission_id: new_submission_id(rng, now),
            runtime_percentile: rng.random(),
            memory_percentile: rng.random(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn submission_id_shape() {
        let now = Utc::now();
        let id = new_submission_id(&mut StdRng::seed_from_u64(1), now);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "sub");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn history_solves_each_problem_once_and_sorts_newest_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let catalog = ProblemCatalog::generate(&mut rng);
        let now = Utc::now();
        let history = generate_history(&catalog, 80, &mut rng, now);

        let accepted: Vec<_> = history.iter().filter(|s| s.status.is_accepted()).collect();
        let unique: HashSet<_> = accepted.iter().map(|s| s.problem_id).collect();
        assert_eq!(accepted.len(), 80);
        assert_eq!(unique.len(), 80);

        assert!(history
            .windows(2)
            .all(|w| w[0].submission_time >= w[1].submission_time));
        assert!(history
            .iter()
            .all(|s| s.submission_time <= now && s.submission_time > now - Duration::days(HISTORY_DAYS)));
    }

    #[test]
    fn runtimes_and_memory_follow_difficulty_bands() {
        let mut rng = StdRng::seed_from_u64(4);
        let catalog = ProblemCatalog::generate(&mut rng);
        let history = generate_history(&catalog, 60, &mut rng, Utc::now());
        for s in &history {
            let base = match catalog.get(s.problem_id).unwrap().difficulty {
                Difficulty::Easy => 50,
                Difficulty::Medium => 100,
                Difficulty::Hard => 200,
            };
            assert!(s.runtime >= base && s.runtime < base * 2);
            assert!((10.0..30.0).contains(&s.memory));
        }
    }

    #[test]
    fn new_submission_validation() {
        let json = serde_json::json!({
            "problemId": 0, "status": "Accepted", "runtime": -5,
            "memory": 12.5, "language": "", "submissionTime": "2024-01-01T00:00:00Z"
        });
        let body: NewSubmission = serde_json::from_value(json).unwrap();
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 3);
        assert!(fields.contains_key("runtime"));
        assert!(fields.contains_key("language"));
        assert!(!fields.contains_key("memory"));
    }

    #[test]
    fn bad_status_or_time_fails_to_parse() {
        let bad_status = serde_json::json!({
            "problemId": 1, "status": "Maybe", "runtime": 5,
            "memory": 1.0, "language": "Rust", "submissionTime": "2024-01-01T00:00:00Z"
        });
        assert!(serde_json::from_value::<NewSubmission>(bad_status).is_err());

        let bad_time = serde_json::json!({
            "problemId": 1, "status": "Accepted", "runtime": 5,
            "memory": 1.0, "language": "Rust", "submissionTime": "not a date"
        });
        assert!(serde_json::from_value::<NewSubmission>(bad_time).is_err());
    }
}
