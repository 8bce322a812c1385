use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use prep_core::cookie_cipher::CookieCipher;
use prep_core::progress::{InMemorySubmissionStore, ProgressService};
use prep_core::roadmap::InMemoryRoadmapCache;
use prep_providers::HttpProviderFactory;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prep_api::config::ServerConfig;
use prep_api::engine::roadmap::RoadmapService;
use prep_api::router::build_app_router;
use prep_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "prep_api=debug,prep_core=debug,prep_providers=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        environment = %config.environment,
        "Loaded server configuration",
    );

    let cipher = CookieCipher::from_secret(&config.cookie_secret);

    // --- Providers ---
    let providers = HttpProviderFactory::new(Duration::from_secs(config.provider_timeout_secs))
        .expect("Failed to build HTTP client for AI providers");

    // --- Services ---
    let progress = Arc::new(ProgressService::new(Arc::new(InMemorySubmissionStore::new())));

    let roadmaps = Arc::new(RoadmapService::new(
        Arc::clone(&progress),
        Arc::new(InMemoryRoadmapCache::new()),
        chrono::Duration::minutes(config.roadmap_cache_ttl_mins),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        cipher: Arc::new(cipher),
        progress,
        roadmaps,
        providers: Arc::new(providers),
        started_at: Instant::now(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
