use std::sync::Arc;
use std::time::Instant;

use prep_core::cookie_cipher::CookieCipher;
use prep_core::progress::ProgressService;
use prep_providers::ProviderFactory;

use crate::config::ServerConfig;
use crate::engine::roadmap::RoadmapService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Seals and opens the config cookie.
    pub cipher: Arc<CookieCipher>,
    /// Mock progress data and the problem catalog.
    pub progress: Arc<ProgressService>,
    /// Roadmap generation and its per-user cache.
    pub roadmaps: Arc<RoadmapService>,
    /// Builds AI provider adapters from cookie or environment settings.
    pub providers: Arc<dyn ProviderFactory>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
