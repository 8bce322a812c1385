use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::UserSubmission;

/// Per-user submission histories, newest first.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Option<Vec<UserSubmission>>;

    /// Store `history` unless the user already has one, and return whichever
    /// history is stored afterwards. First writer wins.
    async fn insert_if_absent(&self, user_id: &str, history: Vec<UserSubmission>) -> Vec<UserSubmission>;

    /// Put a submission at the front of the user's history, creating it if
    /// needed.
    async fn prepend(&self, user_id: &str, submission: UserSubmission);

    async fn user_count(&self) -> usize;
}

/// Process-memory store. Everything is lost on restart.
#[derive(Default)]
pub struct InMemorySubmissionStore {
    histories: RwLock<HashMap<String, Vec<UserSubmission>>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn get(&self, user_id: &str) -> Option<Vec<UserSubmission>> {
        self.histories.read().await.get(user_id).cloned()
    }

    async fn insert_if_absent(&self, user_id: &str, history: Vec<UserSubmission>) -> Vec<UserSubmission> {
        self.histories
            .write()
            .await
            .entry(user_id.to_string())
            .or_insert(history)
            .clone()
    }

    async fn prepend(&self, user_id: &str, submission: UserSubmission) {
        self.histories
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(0, submission);
    }

    async fn user_count(&self) -> usize {
        self.histories.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::progress::SubmissionStatus;

    fn submission(id: &str) -> UserSubmission {
        UserSubmission {
            problem_id: 1,
            status: SubmissionStatus::Accepted,
            runtime: 10,
            memory: 10.0,
            submission_time: Utc::now(),
            language: "Go".into(),
            submission_id: id.into(),
            runtime_percentile: 0.1,
            memory_percentile: 0.2,
        }
    }

    #[tokio::test]
    async fn first_writer_wins() {
        let store = InMemorySubmissionStore::new();
        let first = store.insert_if_absent("a@b.com", vec![submission("one")]).await;
        let second = store.insert_if_absent("a@b.com", vec![submission("two")]).await;
        assert_eq!(first[0].submission_id, "one");
        assert_eq!(second[0].submission_id, "one");
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn prepend_puts_newest_first() {
        let store = InMemorySubmissionStore::new();
        store.insert_if_absent("a@b.com", vec![submission("old")]).await;
        store.prepend("a@b.com", submission("new")).await;
        let history = store.get("a@b.com").await.unwrap();
        assert_eq!(history[0].submission_id, "new");
        assert_eq!(history[1].submission_id, "old");
    }

    #[tokio::test]
    async fn prepend_creates_missing_history() {
        let store = InMemorySubmissionStore::new();
        store.prepend("new@b.com", submission("x")).await;
        assert_eq!(store.get("new@b.com").await.map(|h| h.len()), Some(1));
        assert!(store.get("other@b.com").await.is_none());
    }
}
