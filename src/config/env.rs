//! Environment variable configuration module.
//!
//! Provides environment variable loading and the global `APP_CONFIG` instance.

use std::env;
use std::path::PathBuf;
use std::sync::Once;

use once_cell::sync::Lazy;

static INIT: Once = Once::new();

/// Port the server listens on unless `SERVER_PORT` says otherwise.
pub const DEFAULT_PORT: u16 = 9000;

/// A competitor must score in at least this many events to be ranked.
pub const MIN_EVENTS_TO_QUALIFY: usize = 3;

/// Only this many of a competitor's best event scores count towards the total.
pub const BEST_X_SCORES: usize = 5;

/// Initializes the environment by loading the .env file.
/// This is called automatically when `get_env` is first used.
fn init_env() {
    INIT.call_once(|| {
        if let Err(e) = dotenvy::dotenv() {
            tracing::warn!("Warning: .env file not found or error loading: {}", e);
        }
    });
}

/// Retrieves an environment variable by key.
///
/// If the variable is not set, returns the provided default value.
/// If no default is provided and the variable is not set, returns an empty string.
pub fn get_env(key: &str, default: Option<&str>) -> String {
    init_env();
    env::var(key).unwrap_or_else(|_| default.unwrap_or("").to_string())
}

/// Retrieves an environment variable as a parsed type.
pub fn get_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    init_env();
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Returns true only for the exact `production` environment name.
pub fn is_production_env(node_env: &str) -> bool {
    node_env == "production"
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Server settings
    pub server_port: u16,

    // Environment
    pub node_env: String,
    pub is_production: bool,

    // Client bundle served in production
    pub client_build_dir: PathBuf,

    // Sentry settings
    pub sentry_dsn: String,
    pub sentry_traces_sample_rate: f32,

    // Database settings
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_idle_timeout_secs: u64,
    pub db_max_lifetime_secs: u64,

    // CORS settings
    pub cors_origins: String,

    // Rate limiting
    pub rate_limit_per_second: u64,
    pub rate_limit_burst_size: u32,

    // League rules
    pub min_events_to_qualify: usize,
    pub best_x_scores: usize,

    // Migration
    pub run_migrations: bool,
}

impl AppConfig {
    /// Creates a new `AppConfig` from environment variables.
    pub fn from_env() -> Self {
        let node_env = get_env("NODE_ENV", Some("development"));
        let is_production = is_production_env(&node_env);

        Self {
            server_port: get_env_parsed("SERVER_PORT", DEFAULT_PORT),

            node_env,
            is_production,

            client_build_dir: PathBuf::from(get_env("CLIENT_BUILD_DIR", Some("client/build"))),

            sentry_dsn: get_env("SENTRY_DSN", None),
            sentry_traces_sample_rate: get_env_parsed("SENTRY_TRACES_SAMPLE_RATE", 0.1),

            database_url: database_url_from_env(),
            db_max_connections: get_env_parsed("DB_MAX_CONNECTIONS", 20),
            db_min_connections: get_env_parsed("DB_MIN_CONNECTIONS", 2),
            db_acquire_timeout_secs: get_env_parsed("DB_ACQUIRE_TIMEOUT_SECS", 5),
            db_idle_timeout_secs: get_env_parsed("DB_IDLE_TIMEOUT_SECS", 600),
            db_max_lifetime_secs: get_env_parsed("DB_MAX_LIFETIME_SECS", 1800),

            cors_origins: get_env("CORS_ORIGINS", Some("*")),

            rate_limit_per_second: get_env_parsed("RATE_LIMIT_PER_SECOND", 10),
            rate_limit_burst_size: get_env_parsed("RATE_LIMIT_BURST_SIZE", 50),

            min_events_to_qualify: get_env_parsed("MIN_EVENTS_TO_QUALIFY", MIN_EVENTS_TO_QUALIFY),
            best_x_scores: get_env_parsed("BEST_X_SCORES", BEST_X_SCORES),

            run_migrations: get_env("RUN_MIGRATIONS", Some("true")) == "true",
        }
    }

    /// Path of the SPA entry document inside the client bundle.
    pub fn index_html_path(&self) -> PathBuf {
        self.client_build_dir.join("index.html")
    }
}

/// Uses `DATABASE_URL` when present, otherwise assembles one from the `DB_*` parts.
fn database_url_from_env() -> String {
    let url = get_env("DATABASE_URL", None);
    if !url.is_empty() {
        return url;
    }

    let host = get_env("DB_HOST", Some("localhost"));
    let port = get_env("DB_PORT", Some("5432"));
    let user = get_env("DB_USER", Some("postgres"));
    let password = get_env("DB_PASSWORD", Some("postgres"));
    let dbname = get_env("DB_NAME", Some("league"));

    format!("postgres://{user}:{password}@{host}:{port}/{dbname}")
}

/// Global application configuration instance.
pub static APP_CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
