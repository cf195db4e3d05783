//! Generative model adapters.
//!
//! - `GeminiProvider` - Google Gemini over REST
//! - `ResilientAIProvider` - retry/backoff/timeout wrapper for any provider
//! - `MockAIProvider` - scripted replies for tests

mod gemini_provider;
mod mock_provider;
mod resilient_provider;

pub use gemini_provider::{
    GeminiConfig, GeminiProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
};
pub use mock_provider::{MockAIProvider, DEFAULT_MOCK_REPLY};
pub use resilient_provider::{ResilientAIProvider, RetryPolicy};
