//! Mock AI Provider for tests and offline development.
//!
//! Returns queued responses in order, then a default reply (or a fixed
//! error, when configured with `failing_with`). Every request is recorded
//! for later inspection.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AIError, AIProvider, GenerationRequest, GenerationResponse, ProviderInfo};

/// Text returned once the queue is empty.
pub const DEFAULT_MOCK_REPLY: &str = "Mock response";

/// Configurable in-process provider.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<Result<String, AIError>>>>,
    exhausted: Option<AIError>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            exhausted: None,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        lock(&self.responses).push_back(Ok(text.into()));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: AIError) -> Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// Fails with `error` on every call once the queue is drained.
    pub fn failing_with(mut self, error: AIError) -> Self {
        self.exhausted = Some(error);
        self
    }

    /// Simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        lock(&self.calls).clone()
    }

    fn next_response(&self) -> Result<String, AIError> {
        lock(&self.responses).pop_front().unwrap_or_else(|| match &self.exhausted {
            Some(error) => Err(error.clone()),
            None => Ok(DEFAULT_MOCK_REPLY.to_string()),
        })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AIError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.next_response()
            .map(|text| GenerationResponse::new(text, "mock-model"))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new("system")
    }

    #[tokio::test]
    async fn returns_queued_responses_in_order() {
        let provider = MockAIProvider::new()
            .with_response("first")
            .with_error(AIError::AuthenticationFailed)
            .with_response("third");

        assert_eq!(provider.generate(request()).await.unwrap().text, "first");
        assert_eq!(
            provider.generate(request()).await.unwrap_err(),
            AIError::AuthenticationFailed
        );
        assert_eq!(provider.generate(request()).await.unwrap().text, "third");
    }

    #[tokio::test]
    async fn falls_back_to_default_reply() {
        let provider = MockAIProvider::new();
        assert_eq!(
            provider.generate(request()).await.unwrap().text,
            DEFAULT_MOCK_REPLY
        );
    }

    #[tokio::test]
    async fn failing_with_repeats_error_after_queue() {
        let provider = MockAIProvider::new()
            .with_response("ok")
            .failing_with(AIError::unavailable("down"));

        assert!(provider.generate(request()).await.is_ok());
        for _ in 0..3 {
            assert_eq!(
                provider.generate(request()).await.unwrap_err(),
                AIError::unavailable("down")
            );
        }
    }

    #[tokio::test]
    async fn records_every_call() {
        let provider = MockAIProvider::new();
        provider.generate(GenerationRequest::new("a")).await.unwrap();
        provider.generate(GenerationRequest::new("b")).await.unwrap();

        let calls = provider.get_calls();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(calls[1].system_instruction, "b");
    }

    #[tokio::test]
    async fn clones_share_state() {
        let provider = MockAIProvider::new().with_response("shared");
        let clone = provider.clone();
        assert_eq!(clone.generate(request()).await.unwrap().text, "shared");
        assert_eq!(provider.call_count(), 1);
    }
}
