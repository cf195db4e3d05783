//! Application configuration
//!
//! Settings come from environment variables (and a `.env` file in
//! development) with the `CLINICAL_SIM` prefix; nested keys use `__`.
//!
//! ```no_run
//! use clinical_sim::config::AppConfig;
//!
//! let config = AppConfig::load().expect("configuration");
//! config.validate().expect("valid configuration");
//! ```

mod ai;
mod database;
mod error;
mod server;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;
use std::time::Duration;

/// Headroom for the store reads and writes around a model call.
const PERSISTENCE_MARGIN: Duration = Duration::from_secs(10);

/// Root configuration for the encounter service
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    #[serde(default)]
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// - `CLINICAL_SIM__SERVER__PORT=8080` -> `server.port`
    /// - `CLINICAL_SIM__DATABASE__URL=...` -> `database.url`
    /// - `CLINICAL_SIM__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CLINICAL_SIM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation. A model API key is only mandatory in production;
    /// elsewhere a missing key degrades patient replies instead of failing startup.
    ///
    /// A request makes at most one model call, so the request deadline must
    /// cover that call's full retry schedule. Otherwise the degraded fallback
    /// is cut off by a bare timeout response.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.ai.validate(self.is_production())?;

        let required = self.ai.worst_case_call().saturating_add(PERSISTENCE_MARGIN);
        if self.server.request_timeout() < required {
            return Err(ValidationError::RequestTimeoutBelowModelBudget {
                request_secs: self.server.request_timeout_secs,
                required_secs: required.as_secs_f64().ceil() as u64,
            });
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
