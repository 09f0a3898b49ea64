//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Completion providers (Anthropic, OpenAI, mock) and wrappers
//! - `storage` - Session stores (in-memory, file, Redis)

pub mod ai;
pub mod storage;

pub use ai::{FailoverAIProvider, MockAIProvider, ThrottledAIProvider};
pub use storage::{FileSessionStore, InMemorySessionStore, RedisSessionStore};
