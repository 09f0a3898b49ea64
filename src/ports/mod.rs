//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the counseling domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - The completion capability (routing, analysis, replies)
//! - `SessionStore` - Per-session facets: history, profile, state, roster

mod ai_provider;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, RequestPurpose, TokenUsage,
};
pub use session_store::{Facet, SessionStore, SessionStoreError};
