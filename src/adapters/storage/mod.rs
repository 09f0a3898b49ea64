//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! ## Available Adapters
//!
//! - **InMemorySessionStore** - Stores facets in memory (testing/development)
//! - **FileSessionStore** - Stores facets as YAML files on disk
//! - **RedisSessionStore** - Stores facets as JSON strings in Redis
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSessionStore, InMemorySessionStore};
//!
//! // Console: file-based storage survives restarts
//! let store = FileSessionStore::new("./data/sessions");
//!
//! // Testing: in-memory storage
//! let store = InMemorySessionStore::new();
//! ```

mod file_session_store;
mod in_memory_session_store;
mod redis_session_store;

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;
pub use redis_session_store::{RedisSessionStore, DEFAULT_KEY_PREFIX};
