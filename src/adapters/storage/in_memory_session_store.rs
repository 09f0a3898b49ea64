//! In-Memory Session Store Adapter
//!
//! Keeps every session facet in process memory.
//! Useful for testing and single-process console runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::counseling::{CounselingState, History, SelectedExperts, UserProfile};
use crate::domain::foundation::SessionId;
use crate::ports::{SessionStore, SessionStoreError};

#[derive(Debug, Clone, Default)]
struct SessionRecord {
    history: Option<History>,
    profile: Option<UserProfile>,
    counseling_state: Option<CounselingState>,
    selected_experts: Option<SelectedExperts>,
}

/// In-memory storage for session facets
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionRecord>>>,
}

impl InMemorySessionStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with at least one stored facet
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }

    async fn read<T>(&self, id: &SessionId, pick: impl FnOnce(&SessionRecord) -> Option<T>) -> Option<T> {
        self.sessions.read().await.get(id).and_then(pick)
    }

    async fn write(&self, id: &SessionId, update: impl FnOnce(&mut SessionRecord)) {
        let mut sessions = self.sessions.write().await;
        update(sessions.entry(id.clone()).or_default());
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_history(&self, id: &SessionId) -> Result<History, SessionStoreError> {
        Ok(self
            .read(id, |record| record.history.clone())
            .await
            .unwrap_or_default())
    }

    async fn put_history(&self, id: &SessionId, history: &History) -> Result<(), SessionStoreError> {
        debug!(session_id = %id, entries = history.len(), "Storing history");
        self.write(id, |record| record.history = Some(history.clone()))
            .await;
        Ok(())
    }

    async fn get_profile(&self, id: &SessionId) -> Result<Option<UserProfile>, SessionStoreError> {
        Ok(self.read(id, |record| record.profile.clone()).await)
    }

    async fn put_profile(
        &self,
        id: &SessionId,
        profile: &UserProfile,
    ) -> Result<(), SessionStoreError> {
        self.write(id, |record| record.profile = Some(profile.clone()))
            .await;
        Ok(())
    }

    async fn get_counseling_state(
        &self,
        id: &SessionId,
    ) -> Result<CounselingState, SessionStoreError> {
        Ok(self
            .read(id, |record| record.counseling_state)
            .await
            .unwrap_or_default())
    }

    async fn put_counseling_state(
        &self,
        id: &SessionId,
        state: &CounselingState,
    ) -> Result<(), SessionStoreError> {
        let state = *state;
        self.write(id, |record| record.counseling_state = Some(state))
            .await;
        Ok(())
    }

    async fn get_selected_experts(
        &self,
        id: &SessionId,
    ) -> Result<Option<SelectedExperts>, SessionStoreError> {
        Ok(self.read(id, |record| record.selected_experts.clone()).await)
    }

    async fn put_selected_experts(
        &self,
        id: &SessionId,
        experts: &SelectedExperts,
    ) -> Result<(), SessionStoreError> {
        self.write(id, |record| record.selected_experts = Some(experts.clone()))
            .await;
        Ok(())
    }

    async fn purge(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        debug!(session_id = %id, "Purging session");
        self.sessions.write().await.remove(id);
        Ok(())
    }
}
