//! Failover AI Provider - Wrapper that provides automatic failover between providers.
//!
//! When the primary provider fails with a transient error (rate limit,
//! unavailable, network, timeout), the request is replayed against the
//! fallback provider if one is configured.
//!
//! # Example
//!
//! ```ignore
//! let provider = FailoverAIProvider::new(Arc::new(anthropic))
//!     .with_fallback(Arc::new(openai));
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// AI provider wrapper with automatic failover support.
pub struct FailoverAIProvider {
    primary: Arc<dyn AIProvider>,
    fallback: Option<Arc<dyn AIProvider>>,
}

impl FailoverAIProvider {
    /// Creates a failover provider with only a primary provider.
    pub fn new(primary: Arc<dyn AIProvider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn AIProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn log_usage(provider: &str, request: &CompletionRequest, response: &CompletionResponse) {
        debug!(
            provider,
            model = %response.model,
            session_id = %request.metadata.session_id,
            purpose = %request.metadata.purpose,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Completion finished"
        );
    }
}

#[async_trait]
impl AIProvider for FailoverAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let primary_name = self.primary.provider_info().name;

        let err = match self.primary.complete(request.clone()).await {
            Ok(response) => {
                Self::log_usage(&primary_name, &request, &response);
                return Ok(response);
            }
            Err(err) => err,
        };

        match &self.fallback {
            Some(fallback) if err.is_retryable() => {
                let fallback_name = fallback.provider_info().name;
                warn!(
                    primary = %primary_name,
                    fallback = %fallback_name,
                    reason = %err,
                    trace_id = %request.metadata.trace_id,
                    "Primary provider failed, using fallback"
                );
                let response = fallback.complete(request.clone()).await?;
                Self::log_usage(&fallback_name, &request, &response);
                Ok(response)
            }
            _ => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.primary.provider_info()
    }
}
