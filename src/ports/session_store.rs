//! Session Store Port - Interface for persisting session facets.
//!
//! A session owns four independent facets stored under the same id:
//! history, user profile, counseling state, and selected experts. Each facet
//! is read and written as a whole document. Absence is not an error; it is
//! how a new session looks.

use async_trait::async_trait;

use crate::domain::counseling::{CounselingState, History, SelectedExperts, UserProfile};
use crate::domain::foundation::SessionId;

/// Errors that can occur during session store operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Failed to serialize {facet}: {message}")]
    SerializationFailed { facet: Facet, message: String },

    #[error("Failed to deserialize {facet}: {message}")]
    DeserializationFailed { facet: Facet, message: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl SessionStoreError {
    pub fn serialization(facet: Facet, err: impl std::fmt::Display) -> Self {
        Self::SerializationFailed {
            facet,
            message: err.to_string(),
        }
    }

    pub fn deserialization(facet: Facet, err: impl std::fmt::Display) -> Self {
        Self::DeserializationFailed {
            facet,
            message: err.to_string(),
        }
    }
}

/// The four per-session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    History,
    Profile,
    CounselingState,
    SelectedExperts,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::History,
        Facet::Profile,
        Facet::CounselingState,
        Facet::SelectedExperts,
    ];

    /// Stable key segment used by persistent backends.
    pub fn key(&self) -> &'static str {
        match self {
            Facet::History => "history",
            Facet::Profile => "profile",
            Facet::CounselingState => "counseling_state",
            Facet::SelectedExperts => "selected_experts",
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Port for the per-session key/value store.
///
/// Every `put_*` is a full overwrite of that facet. Implementations must be
/// safe to share across tasks; turns on different sessions run in parallel.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Full history, or an empty one for an unknown session.
    async fn get_history(&self, id: &SessionId) -> Result<History, SessionStoreError>;

    async fn put_history(&self, id: &SessionId, history: &History)
        -> Result<(), SessionStoreError>;

    async fn get_profile(&self, id: &SessionId) -> Result<Option<UserProfile>, SessionStoreError>;

    async fn put_profile(
        &self,
        id: &SessionId,
        profile: &UserProfile,
    ) -> Result<(), SessionStoreError>;

    /// Stored state, or `(Exploration, 0)` when absent.
    async fn get_counseling_state(
        &self,
        id: &SessionId,
    ) -> Result<CounselingState, SessionStoreError>;

    async fn put_counseling_state(
        &self,
        id: &SessionId,
        state: &CounselingState,
    ) -> Result<(), SessionStoreError>;

    async fn get_selected_experts(
        &self,
        id: &SessionId,
    ) -> Result<Option<SelectedExperts>, SessionStoreError>;

    async fn put_selected_experts(
        &self,
        id: &SessionId,
        experts: &SelectedExperts,
    ) -> Result<(), SessionStoreError>;

    /// Removes every facet of the session. Purging an unknown id is a no-op.
    async fn purge(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facet_keys_are_distinct() {
        let mut keys: Vec<_> = Facet::ALL.iter().map(Facet::key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn serialization_error_names_facet() {
        let err = SessionStoreError::serialization(Facet::History, "bad yaml");
        assert_eq!(err.to_string(), "Failed to serialize history: bad yaml");
    }

    #[test]
    fn deserialization_error_names_facet() {
        let err = SessionStoreError::deserialization(Facet::CounselingState, "eof");
        assert!(err.to_string().contains("counseling_state"));
    }
}
