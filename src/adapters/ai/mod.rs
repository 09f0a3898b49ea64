//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `AnthropicProvider` - Anthropic Messages API
//! - `OpenAIProvider` - OpenAI Chat Completions API
//! - `FailoverAIProvider` - Wrapper with automatic failover between providers
//! - `ThrottledAIProvider` - Token bucket, concurrency cap and per-call timeout

mod anthropic_provider;
mod failover_provider;
mod mock_provider;
mod openai_provider;
mod retry;
mod throttled_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use failover_provider::FailoverAIProvider;
pub use mock_provider::{MockAIProvider, MockError, MockMatcher, MockResponse, DEFAULT_MOCK_RESPONSE};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
pub use throttled_provider::{ThrottleConfig, ThrottledAIProvider};
