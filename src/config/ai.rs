//! Generative model configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Generative model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key. Optional outside production; calls then fail as
    /// "not configured" and callers degrade.
    pub gemini_api_key: Option<Secret<String>>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// REST base URL up to `/models`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for a single attempt, in seconds
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// Total attempts per call, first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff, in milliseconds
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier_ms: u64,

    /// Ceiling for any single backoff wait, in milliseconds
    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,
}

impl AiConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Longest one model call can take: every attempt timing out, with the
    /// full backoff ceiling waited between attempts.
    pub fn worst_case_call(&self) -> Duration {
        let attempts = self.attempt_timeout().saturating_mul(self.max_attempts);
        let backoff_ms: u64 = (1..self.max_attempts)
            .map(|attempt| {
                let exponent = (attempt - 1).min(31);
                self.backoff_multiplier_ms
                    .saturating_mul(1u64 << exponent)
                    .min(self.backoff_max_ms)
            })
            .fold(0, u64::saturating_add);
        attempts.saturating_add(Duration::from_millis(backoff_ms))
    }

    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate model configuration
    ///
    /// The API key is only mandatory when `require_key` is set.
    pub fn validate(&self, require_key: bool) -> Result<(), ValidationError> {
        if require_key && !self.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__GEMINI_API_KEY"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidModelUrl);
        }
        if self.attempt_timeout_secs == 0 || self.attempt_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidAttemptCount);
        }
        if self.backoff_max_ms == 0 || self.backoff_max_ms < self.backoff_multiplier_ms {
            return Err(ValidationError::InvalidBackoff);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            attempt_timeout_secs: default_attempt_timeout(),
            max_attempts: default_max_attempts(),
            backoff_multiplier_ms: default_backoff_multiplier(),
            backoff_max_ms: default_backoff_max(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_attempt_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_multiplier() -> u64 {
    1_000
}

fn default_backoff_max() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key() -> AiConfig {
        AiConfig {
            gemini_api_key: Some(Secret::new("AIza-test".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_retry_schedule() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.backoff_multiplier_ms, 1_000);
        assert_eq!(config.backoff_max_ms, 10_000);
        assert_eq!(config.attempt_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn worst_case_call_sums_timeouts_and_capped_backoff() {
        // 5 x 30s plus waits of 1, 2, 4 and 8 seconds
        assert_eq!(AiConfig::default().worst_case_call(), Duration::from_secs(165));

        let capped = AiConfig {
            max_attempts: 7,
            ..Default::default()
        };
        // 7 x 30s plus 1, 2, 4, 8, 10 and 10 seconds
        assert_eq!(capped.worst_case_call(), Duration::from_secs(245));

        let single = AiConfig {
            max_attempts: 1,
            ..Default::default()
        };
        assert_eq!(single.worst_case_call(), Duration::from_secs(30));
    }

    #[test]
    fn key_required_only_on_request() {
        assert!(AiConfig::default().validate(false).is_ok());
        assert_eq!(
            AiConfig::default().validate(true),
            Err(ValidationError::MissingRequired("AI__GEMINI_API_KEY"))
        );
        assert!(with_key().validate(true).is_ok());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = AiConfig {
            gemini_api_key: Some(Secret::new("  ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_api_key());
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = AiConfig {
            max_attempts: 0,
            ..with_key()
        };
        assert_eq!(config.validate(true), Err(ValidationError::InvalidAttemptCount));
    }

    #[test]
    fn backoff_ceiling_below_multiplier_rejected() {
        let config = AiConfig {
            backoff_multiplier_ms: 5_000,
            backoff_max_ms: 1_000,
            ..with_key()
        };
        assert_eq!(config.validate(true), Err(ValidationError::InvalidBackoff));
    }

    #[test]
    fn non_http_base_url_rejected() {
        let config = AiConfig {
            base_url: "ftp://models".to_string(),
            ..with_key()
        };
        assert_eq!(config.validate(true), Err(ValidationError::InvalidModelUrl));
    }

    #[test]
    fn debug_output_redacts_key() {
        let rendered = format!("{:?}", with_key());
        assert!(!rendered.contains("AIza-test"));
    }
}
