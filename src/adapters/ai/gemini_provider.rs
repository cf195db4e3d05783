//! Gemini Provider - AIProvider over the Generative Language REST API.
//!
//! One call is one HTTP request; retries live in `ResilientAIProvider`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;
use crate::domain::conversation::{BlockRole, ContentBlock};
use crate::ports::{
    AIError, AIProvider, FinishReason, GenerationParams, GenerationRequest, GenerationResponse,
    ProviderInfo, ResponseFormat, SafetyThreshold,
};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Harm categories that accept a threshold.
const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Missing keys are reported per call as `AIError::NotConfigured`.
    api_key: Option<Secret<String>>,
    pub model: String,
    pub base_url: String,
    /// Transport-level timeout for one HTTP exchange.
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(Secret::new(api_key.into())),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builds from application config; the key may be absent.
    pub fn from_ai_config(config: &AiConfig) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout: config.attempt_timeout(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

/// Gemini REST provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::NotConfigured(format!("failed to build HTTP client: {}", e)))?;

        if !config.has_api_key() {
            tracing::warn!("Gemini API key is missing; model calls will fail until configured");
        }

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<Response, AIError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .filter(|_| self.config.has_api_key())
            .ok_or_else(|| AIError::NotConfigured("Gemini API key is missing".to_string()))?;

        self.client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key.expose_secret().as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    async fn parse_response(&self, response: Response) -> Result<GenerationResponse, AIError> {
        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body, retry_after));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse Gemini response: {}", e)))?;

        extract_response(parsed, &self.config.model)
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AIError> {
        let body = GenerateContentRequest::from_request(&request);
        tracing::debug!(
            model = %self.config.model,
            blocks = body.contents.len(),
            "sending Gemini generateContent request"
        );

        let response = self.send_request(&body).await?;
        self.parse_response(response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

fn map_http_error(status: StatusCode, body: &str, retry_after: Option<u32>) -> AIError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|w| w.error.message)
        .unwrap_or_else(|| body.to_string());

    match status.as_u16() {
        401 | 403 => AIError::AuthenticationFailed,
        400 if message.contains("API key") => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(retry_after),
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, message)),
        _ => AIError::InvalidRequest(format!("Unexpected status {}: {}", status, message)),
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<u32> {
    header?.to_str().ok()?.trim().parse().ok()
}

fn extract_response(response: GenerateContentResponse, model: &str) -> Result<GenerationResponse, AIError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AIError::content_filtered(reason));
    }

    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| AIError::parse("Gemini returned no candidates"))?;

    let finish_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") | None => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::MaxTokens,
        Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => FinishReason::Safety,
        Some(_) => FinishReason::Other,
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(match finish_reason {
            FinishReason::Safety => AIError::content_filtered("response blocked by safety filter"),
            _ => AIError::parse("Gemini returned no text in the response candidates"),
        });
    }

    Ok(GenerationResponse {
        text,
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        finish_reason,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Gemini API Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    fn from_request(request: &GenerationRequest) -> Self {
        let system_instruction = Some(request.system_instruction.trim())
            .filter(|s| !s.is_empty())
            .map(|text| SystemInstruction {
                parts: vec![Part { text: text.to_string() }],
            });

        Self {
            contents: request.blocks.iter().map(Content::from_block).collect(),
            system_instruction,
            generation_config: GenerationConfig::from_params(&request.params),
            safety_settings: safety_settings(request.params.safety),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

impl Content {
    fn from_block(block: &ContentBlock) -> Self {
        let role = match block.role {
            BlockRole::Requester => "user",
            BlockRole::Responder => "model",
        };
        Self {
            role,
            parts: vec![Part {
                text: block.text.clone(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl GenerationConfig {
    fn from_params(params: &GenerationParams) -> Self {
        Self {
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
            response_mime_type: match params.response_format {
                ResponseFormat::Json => Some("application/json"),
                ResponseFormat::Text => None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

fn safety_settings(threshold: SafetyThreshold) -> Vec<SafetySetting> {
    match threshold {
        SafetyThreshold::Default => Vec::new(),
        SafetyThreshold::BlockNone => HARM_CATEGORIES
            .iter()
            .map(|&category| SafetySetting {
                category,
                threshold: "BLOCK_NONE",
            })
            .collect(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
