use prep_core::roadmap::DEFAULT_CACHE_TTL_MINS;

/// Server configuration loaded from environment variables.
///
/// All fields except the cookie secret have defaults suitable for local
/// development.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3004`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGIN`.
    pub cors_origins: Vec<String>,
    /// Whole-request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Outbound AI provider timeout in seconds (default: `60`).
    pub provider_timeout_secs: u64,
    /// Secret the config cookie key is derived from.
    pub cookie_secret: String,
    /// Roadmap cache lifetime in minutes (default: `120`).
    pub roadmap_cache_ttl_mins: i64,
    /// Deployment environment name from `NODE_ENV` (default: `development`).
    pub environment: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("roadmap_cache_ttl_mins", &self.roadmap_cache_ttl_mins)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3004`                  |
    /// | `CORS_ORIGIN`            | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`   | `120`                   |
    /// | `PROVIDER_TIMEOUT_SECS`  | `60`                    |
    /// | `CONFIG_COOKIE_SECRET`   | required                |
    /// | `ROADMAP_CACHE_TTL_MINS` | `120`                   |
    /// | `NODE_ENV`               | `development`           |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3004".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let provider_timeout_secs: u64 = std::env::var("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("PROVIDER_TIMEOUT_SECS must be a valid u64");

        let cookie_secret = std::env::var("CONFIG_COOKIE_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .expect("CONFIG_COOKIE_SECRET must be set");

        let roadmap_cache_ttl_mins: i64 = std::env::var("ROADMAP_CACHE_TTL_MINS")
            .map(|v| v.parse().expect("ROADMAP_CACHE_TTL_MINS must be a valid i64"))
            .unwrap_or(DEFAULT_CACHE_TTL_MINS);

        let environment = std::env::var("NODE_ENV").unwrap_or_else(|_| "development".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            provider_timeout_secs,
            cookie_secret,
            roadmap_cache_ttl_mins,
            environment,
        }
    }

    /// Cookies are marked `Secure` only in production.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
