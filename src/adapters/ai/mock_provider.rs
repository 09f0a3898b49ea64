//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Matching rules that answer or fail specific calls (by purpose, system
//!   instruction, or prompt text) regardless of call order
//! - Simulated delays for timeout testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .respond_to(RequestPurpose::Routing, r#"["CBT Expert"]"#)
//!     .fail_when_system_contains("Dr. Beck", MockError::Network { message: "reset".into() })
//!     .with_response("Hello, I'm Dr. Helen.");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    RequestPurpose, TokenUsage,
};

/// Default content when no rule matches and the queue is empty.
pub const DEFAULT_MOCK_RESPONSE: &str = "Mock response";

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Persistent rules, checked before the queue. First match wins.
    rules: Arc<Mutex<Vec<MockRule>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

/// Which requests a rule applies to.
#[derive(Debug, Clone)]
pub enum MockMatcher {
    /// System instruction contains the text.
    SystemContains(String),
    /// Prompt content contains the text.
    PromptContains(String),
    /// Request metadata carries exactly this purpose.
    Purpose(RequestPurpose),
    /// Any expert analysis call.
    AnyExpertAnalysis,
}

impl MockMatcher {
    fn matches(&self, request: &CompletionRequest) -> bool {
        match self {
            MockMatcher::SystemContains(text) => request
                .system_prompt
                .as_deref()
                .is_some_and(|system| system.contains(text.as_str())),
            MockMatcher::PromptContains(text) => request.prompt_text().contains(text.as_str()),
            MockMatcher::Purpose(purpose) => &request.metadata.purpose == purpose,
            MockMatcher::AnyExpertAnalysis => {
                matches!(request.metadata.purpose, RequestPurpose::ExpertAnalysis(_))
            }
        }
    }
}

#[derive(Debug, Clone)]
struct MockRule {
    matcher: MockMatcher,
    response: MockResponse,
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContextTooLong { tokens: u32, max: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Parse { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContextTooLong { tokens, max } => AIError::context_too_long(tokens, max),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Parse { message } => AIError::parse(message),
            MockError::Timeout { timeout_secs } => AIError::timeout(timeout_secs),
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            rules: Arc::new(Mutex::new(Vec::new())),
            info: ProviderInfo::new("mock", "mock-model-1", 128000),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            finish_reason: FinishReason::Stop,
        })
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Adds a persistent rule.
    pub fn with_rule(self, matcher: MockMatcher, response: MockResponse) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push(MockRule { matcher, response });
        self
    }

    /// Answers every call with this purpose with `content`.
    pub fn respond_to(self, purpose: RequestPurpose, content: impl Into<String>) -> Self {
        self.with_rule(
            MockMatcher::Purpose(purpose),
            MockResponse::Success {
                content: content.into(),
                finish_reason: FinishReason::Stop,
            },
        )
    }

    /// Fails every call with this purpose.
    pub fn fail_on(self, purpose: RequestPurpose, error: MockError) -> Self {
        self.with_rule(MockMatcher::Purpose(purpose), MockResponse::Error(error))
    }

    /// Fails every call whose system instruction contains `pattern`.
    pub fn fail_when_system_contains(self, pattern: impl Into<String>, error: MockError) -> Self {
        self.with_rule(
            MockMatcher::SystemContains(pattern.into()),
            MockResponse::Error(error),
        )
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls made for the given purpose.
    pub fn calls_for(&self, purpose: &RequestPurpose) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| &call.metadata.purpose == purpose)
            .cloned()
            .collect()
    }

    /// Names of experts analyzed, in call order.
    pub fn analyzed_experts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match &call.metadata.purpose {
                RequestPurpose::ExpertAnalysis(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Matching rule, then queued response, then the default.
    fn next_response(&self, request: &CompletionRequest) -> MockResponse {
        let ruled = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|rule| rule.matcher.matches(request))
            .map(|rule| rule.response.clone());
        if let Some(response) = ruled {
            return response;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: DEFAULT_MOCK_RESPONSE.to_string(),
                finish_reason: FinishReason::Stop,
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.next_response(&request);
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match response {
            MockResponse::Success {
                content,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 20),
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
