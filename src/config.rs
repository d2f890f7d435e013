//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. The session signing key is shared with the
//! identity provider that issues user JWTs.

use std::env;
use std::time::Duration;

const DEFAULT_STATS_FETCH_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_STATS_FETCH_ATTEMPTS: u32 = 2;
const MAX_STATS_FETCH_ATTEMPTS: u32 = 5;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// HS256 key used to verify session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Upper bound for a single statistics query
    pub stats_fetch_timeout: Duration,
    /// Attempts per statistics query before falling back to zeroed stats
    pub stats_fetch_attempts: u32,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            stats_fetch_timeout: Duration::from_millis(DEFAULT_STATS_FETCH_TIMEOUT_MS),
            stats_fetch_attempts: 1,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let stats_fetch_timeout_ms: u64 = parse_or_default(
            "STATS_FETCH_TIMEOUT_MS",
            DEFAULT_STATS_FETCH_TIMEOUT_MS,
        )?;
        // A zero timeout fails every attempt before it starts.
        if stats_fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid("STATS_FETCH_TIMEOUT_MS"));
        }
        let stats_fetch_attempts: u32 =
            parse_or_default("STATS_FETCH_ATTEMPTS", DEFAULT_STATS_FETCH_ATTEMPTS)?;

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or_default("PORT", 8080)?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            stats_fetch_timeout: Duration::from_millis(stats_fetch_timeout_ms),
            stats_fetch_attempts: stats_fetch_attempts.clamp(1, MAX_STATS_FETCH_ATTEMPTS),
        })
    }
}

fn parse_or_default<T: std::str::FromStr>(
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
