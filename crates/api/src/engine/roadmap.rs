//! Roadmap generation: cache lookup, prompt, provider call, parse, store.

use std::sync::Arc;

use chrono::Utc;
use prep_core::progress::ProgressService;
use prep_core::roadmap::{
    build_prompt, parse_roadmap, CachedRoadmap, RoadmapCache, RoadmapContext, RoadmapParseError,
    RoadmapPreferences, StudyRoadmap,
};
use prep_core::types::Timestamp;
use prep_providers::{AiProvider, ChatMessage, ChatOptions, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum RoadmapError {
    /// The user's provider settings cannot produce an adapter.
    #[error("{0}")]
    Configuration(String),

    /// The provider call failed (HTTP status, transport, empty reply).
    #[error("AI provider error: {0}")]
    Provider(ProviderError),

    /// The provider replied with something that is not a roadmap.
    #[error(transparent)]
    Parse(#[from] RoadmapParseError),
}

impl From<ProviderError> for RoadmapError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Configuration(msg) => Self::Configuration(msg),
            other => Self::Provider(other),
        }
    }
}

/// A roadmap plus where it came from.
#[derive(Debug, Clone)]
pub struct GeneratedRoadmap {
    pub roadmap: StudyRoadmap,
    pub cached: bool,
    pub expires_at: Timestamp,
}

pub struct RoadmapService {
    progress: Arc<ProgressService>,
    cache: Arc<dyn RoadmapCache>,
    ttl: chrono::Duration,
}

impl RoadmapService {
    pub fn new(
        progress: Arc<ProgressService>,
        cache: Arc<dyn RoadmapCache>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            progress,
            cache,
            ttl,
        }
    }

    /// Return the cached roadmap unless `force_regenerate` is set or the
    /// entry has expired, otherwise generate a fresh one with `provider` and
    /// cache it.
    pub async fn generate_roadmap(
        &self,
        user_id: &str,
        provider: &dyn AiProvider,
        preferences: Option<RoadmapPreferences>,
        force_regenerate: bool,
    ) -> Result<GeneratedRoadmap, RoadmapError> {
        if !force_regenerate {
            if let Some(entry) = self.cache.get(user_id, Utc::now()).await {
                tracing::debug!(user_id, expires_at = %entry.expires_at, "Roadmap served from cache");
                return Ok(GeneratedRoadmap {
                    roadmap: entry.roadmap,
                    cached: true,
                    expires_at: entry.expires_at,
                });
            }
        }

        let progress = self.progress.get_user_progress(user_id).await;
        let context = RoadmapContext::from_progress(&progress, preferences);
        let prompt = build_prompt(&context, Utc::now());

        tracing::info!(
            user_id,
            provider = %provider.kind(),
            model = provider.model(),
            skill_level = context.skill_level().as_str(),
            "Generating roadmap",
        );

        let messages = [
            ChatMessage::system(prompt.system),
            ChatMessage::user(prompt.user),
        ];
        let reply = provider.chat_with(&messages, &ChatOptions::json()).await?;

        let now = Utc::now();
        let roadmap = parse_roadmap(&reply.content, user_id, now)?;
        let entry = CachedRoadmap::new(roadmap.clone(), now, self.ttl);
        let expires_at = entry.expires_at;
        self.cache.put(user_id, entry).await;

        tracing::info!(
            user_id,
            problems = roadmap.recommended_problems.len(),
            %expires_at,
            "Roadmap generated and cached",
        );

        Ok(GeneratedRoadmap {
            roadmap,
            cached: false,
            expires_at,
        })
    }

    /// Drop one user's cached roadmap, or every entry when `user_id` is `None`.
    pub async fn clear_cache(&self, user_id: Option<&str>) {
        match user_id {
            Some(id) => {
                let removed = self.cache.remove(id).await;
                tracing::info!(user_id = id, removed, "Cleared roadmap cache entry");
            }
            None => {
                self.cache.clear().await;
                tracing::info!("Cleared all cached roadmaps");
            }
        }
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.entry_count().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use prep_core::progress::InMemorySubmissionStore;
    use prep_core::provider_catalog::ProviderKind;
    use prep_core::roadmap::InMemoryRoadmapCache;
    use prep_providers::ChatResponse;

    use super::*;

    const ROADMAP_JSON: &str = r#"{
        "nextFocusArea": {"topic": "Graph", "reason": "Lowest coverage", "priority": "high"},
        "recommendedProblems": [
            {"problemId": 7, "title": "Clone Graph", "difficulty": "Medium", "topic": "Graph", "order": 9},
            {"problemId": 8, "title": "Course Schedule", "difficulty": "Medium", "topic": "Graph", "order": 3}
        ],
        "studyPlan": {"weeklyGoals": ["Finish graph basics"], "dailyTimeRecommendation": 60},
        "weakestTopics": [],
        "overallRecommendation": {"skillLevel": "intermediate", "readinessScore": 55}
    }"#;

    struct ScriptedProvider {
        reply: Result<String, u16>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn replying(content: &str) -> Self {
            Self {
                reply: Ok(content.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenAi
        }

        fn model(&self) -> &str {
            "gpt-4"
        }

        async fn chat_with(
            &self,
            _messages: &[ChatMessage],
            options: &ChatOptions,
        ) -> Result<ChatResponse, ProviderError> {
            assert!(options.json_mode);
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(content) => Ok(ChatResponse {
                    content: content.clone(),
                    model: "gpt-4".into(),
                    usage: None,
                }),
                Err(status) => Err(ProviderError::Api {
                    provider: "OpenAI",
                    status: *status,
                    status_text: "Unauthorized".into(),
                }),
            }
        }

        async fn validate_api_key(&self) -> bool {
            true
        }
    }

    fn service(ttl: chrono::Duration) -> RoadmapService {
        let progress = Arc::new(ProgressService::with_seed(
            Arc::new(InMemorySubmissionStore::new()),
            11,
        ));
        RoadmapService::new(progress, Arc::new(InMemoryRoadmapCache::new()), ttl)
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let svc = service(chrono::Duration::minutes(120));
        let provider = ScriptedProvider::replying(ROADMAP_JSON);

        let first = svc
            .generate_roadmap("a@example.com", &provider, None, false)
            .await
            .unwrap();
        let second = svc
            .generate_roadmap("a@example.com", &provider, None, false)
            .await
            .unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.roadmap, second.roadmap);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_regenerate_bypasses_cache() {
        let svc = service(chrono::Duration::minutes(120));
        let provider = ScriptedProvider::replying(ROADMAP_JSON);

        svc.generate_roadmap("a@example.com", &provider, None, false)
            .await
            .unwrap();
        let forced = svc
            .generate_roadmap("a@example.com", &provider, None, true)
            .await
            .unwrap();

        assert!(!forced.cached);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entry_is_regenerated() {
        let svc = service(chrono::Duration::zero() - chrono::Duration::seconds(1));
        let provider = ScriptedProvider::replying(ROADMAP_JSON);

        svc.generate_roadmap("a@example.com", &provider, None, false)
            .await
            .unwrap();
        let again = svc
            .generate_roadmap("a@example.com", &provider, None, false)
            .await
            .unwrap();

        assert!(!again.cached);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn generated_roadmap_is_renumbered_for_the_user() {
        let svc = service(chrono::Duration::minutes(120));
        let provider = ScriptedProvider::replying(ROADMAP_JSON);

        let out = svc
            .generate_roadmap("b@example.com", &provider, None, false)
            .await
            .unwrap();

        assert_eq!(out.roadmap.user_id, "b@example.com");
        assert_eq!(out.roadmap.recommended_problems[0].problem_id, 1000);
        assert_eq!(out.roadmap.recommended_problems[1].order, 2);
    }

    #[tokio::test]
    async fn provider_failure_is_not_cached() {
        let svc = service(chrono::Duration::minutes(120));
        let provider = ScriptedProvider::failing(401);

        let err = svc
            .generate_roadmap("a@example.com", &provider, None, false)
            .await
            .unwrap_err();

        assert_matches!(err, RoadmapError::Provider(ProviderError::Api { status: 401, .. }));
        assert_eq!(svc.cached_count().await, 0);
    }

    #[tokio::test]
    async fn malformed_reply_is_parse_error() {
        let svc = service(chrono::Duration::minutes(120));
        let provider = ScriptedProvider::replying(r#"{"nextFocusArea": {}}"#);

        let err = svc
            .generate_roadmap("a@example.com", &provider, None, false)
            .await
            .unwrap_err();

        assert_matches!(err, RoadmapError::Parse(RoadmapParseError::MissingField(_)));
    }

    #[tokio::test]
    async fn clear_cache_for_one_user() {
        let svc = service(chrono::Duration::minutes(120));
        let provider = ScriptedProvider::replying(ROADMAP_JSON);

        svc.generate_roadmap("a@example.com", &provider, None, false)
            .await
            .unwrap();
        svc.generate_roadmap("b@example.com", &provider, None, false)
            .await
            .unwrap();
        svc.clear_cache(Some("a@example.com")).await;
        assert_eq!(svc.cached_count().await, 1);

        svc.clear_cache(None).await;
        assert_eq!(svc.cached_count().await, 0);
    }

    #[test]
    fn configuration_provider_error_maps_to_configuration() {
        let err = RoadmapError::from(ProviderError::Configuration("API key is required".into()));
        assert_matches!(err, RoadmapError::Configuration(msg) if msg == "API key is required");
    }
}
