//! AI Provider Port - Interface for the generative text model.
//!
//! Every call is stateless: the request carries the full reconstructed
//! conversation, a system instruction and the generation parameters.
//!
//! # Failure classification
//!
//! `AIError::is_retryable` splits failures into transient (rate limiting,
//! overload, timeouts, network) and fatal (authentication, configuration,
//! malformed request, filtered content, unparseable response). Only the
//! resilient wrapper retries; after it gives up it reports
//! `AIError::RetriesExhausted`, the "model unavailable" condition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::conversation::ContentBlock;

/// Port for generative model interactions.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generates one complete text response.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AIError>;

    /// Provider name and model identifier, for logging.
    fn provider_info(&self) -> ProviderInfo;
}

/// Output constraint requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Constrain output to a JSON document.
    Json,
}

/// Content-safety threshold applied to every harm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyThreshold {
    /// Provider defaults.
    #[default]
    Default,
    /// Least restrictive setting, needed for clinical vocabulary.
    BlockNone,
}

/// Sampling and output parameters for one call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub response_format: ResponseFormat,
    pub safety: SafetyThreshold,
}

impl GenerationParams {
    /// Simulated patient: varied replies, short, unfiltered.
    pub fn patient() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: Some(300),
            response_format: ResponseFormat::Text,
            safety: SafetyThreshold::BlockNone,
        }
    }

    /// Placement quiz: JSON, moderately creative.
    pub fn quiz() -> Self {
        Self {
            temperature: 0.5,
            max_output_tokens: None,
            response_format: ResponseFormat::Json,
            safety: SafetyThreshold::BlockNone,
        }
    }

    /// RIME evaluation: JSON, low temperature for consistent scoring.
    pub fn evaluation() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: None,
            response_format: ResponseFormat::Json,
            safety: SafetyThreshold::BlockNone,
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_output_tokens: None,
            response_format: ResponseFormat::Text,
            safety: SafetyThreshold::Default,
        }
    }
}

/// A stateless generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub blocks: Vec<ContentBlock>,
    pub system_instruction: String,
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            blocks: Vec::new(),
            system_instruction: system_instruction.into(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<ContentBlock>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

/// A complete model response.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub text: String,
    pub model: String,
    pub finish_reason: FinishReason,
}

impl GenerationResponse {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Provider identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Generative model failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AIError {
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u32> },

    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model client is not configured: {0}")]
    NotConfigured(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    /// Transient failures persisted through every attempt.
    #[error("model unavailable after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: Box<AIError>,
    },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: Option<u32>) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn retries_exhausted(attempts: u32, last_error: AIError) -> Self {
        Self::RetriesExhausted {
            attempts,
            last_error: Box::new(last_error),
        }
    }

    /// True for transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }

    /// True once the retry budget has been spent.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, AIError::RetriesExhausted { .. })
    }
}
