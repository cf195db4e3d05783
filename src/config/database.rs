//! Encounter store connection settings

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

/// PostgreSQL pool settings for the encounter store
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` connection URL
    pub url: String,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a free connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Seconds before an unused connection is closed
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply bundled migrations at startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Pool builder carrying these limits. The caller supplies the URL.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout())
            .idle_timeout(Some(self.idle_timeout()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > 100 {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_run_migrations() -> bool {
    true
}
