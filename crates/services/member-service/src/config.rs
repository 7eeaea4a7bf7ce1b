//! Member service configuration.

use std::env;

use common::DatabaseConfig;
use domain::DEFAULT_SEED_COUNT;

const ENV_PREFIX: &str = "MEMBER_SERVICE";

/// Member service configuration.
///
/// Host and port are command-line arguments of `serve`
/// (`MEMBER_SERVICE_HOST` / `MEMBER_SERVICE_PORT`).
#[derive(Debug, Clone)]
pub struct MemberServiceConfig {
    /// Database connection and pool settings
    pub database: DatabaseConfig,
    /// Insert sample members on startup
    pub seed: bool,
    /// Number of members the startup seed inserts
    pub seed_count: u32,
    /// Name stamped into `created_by` / `last_modified_by`
    pub auditor: Option<String>,
}

impl MemberServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database: DatabaseConfig::from_env(ENV_PREFIX),
            seed: env::var("MEMBER_SERVICE_SEED")
                .ok()
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.seed),
            seed_count: env::var("MEMBER_SERVICE_SEED_COUNT")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(defaults.seed_count),
            auditor: env::var("MEMBER_SERVICE_AUDITOR")
                .ok()
                .filter(|name| !name.trim().is_empty()),
        }
    }
}

impl Default for MemberServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            seed: false,
            seed_count: DEFAULT_SEED_COUNT,
            auditor: None,
        }
    }
}
