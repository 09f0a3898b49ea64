//! File-based Session Store Adapter
//!
//! Stores each session facet as a YAML document on disk:
//!
//! ```text
//! {base_path}/{session_id}/history.yaml
//! {base_path}/{session_id}/profile.yaml
//! {base_path}/{session_id}/counseling_state.yaml
//! {base_path}/{session_id}/selected_experts.yaml
//! ```
//!
//! A missing file reads as an absent facet.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::domain::counseling::{CounselingState, History, SelectedExperts, UserProfile};
use crate::domain::foundation::SessionId;
use crate::ports::{Facet, SessionStore, SessionStoreError};

/// File-based storage for session facets
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./data/sessions");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn session_dir(&self, id: &SessionId) -> PathBuf {
        self.base_path.join(id.as_str())
    }

    fn facet_path(&self, id: &SessionId, facet: Facet) -> PathBuf {
        self.session_dir(id).join(format!("{}.yaml", facet.key()))
    }

    async fn load<T: DeserializeOwned>(
        &self,
        id: &SessionId,
        facet: Facet,
    ) -> Result<Option<T>, SessionStoreError> {
        let path = self.facet_path(id, facet);
        let yaml = match fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionStoreError::Io(e.to_string())),
        };

        serde_yaml::from_str(&yaml)
            .map(Some)
            .map_err(|e| SessionStoreError::deserialization(facet, e))
    }

    /// Writes to a sibling temp file, then renames over the target, so a
    /// reader never observes a half-written document.
    async fn save<T: Serialize>(
        &self,
        id: &SessionId,
        facet: Facet,
        value: &T,
    ) -> Result<(), SessionStoreError> {
        let yaml =
            serde_yaml::to_string(value).map_err(|e| SessionStoreError::serialization(facet, e))?;

        let dir = self.session_dir(id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;

        let path = self.facet_path(id, facet);
        let tmp = dir.join(format!(".{}.yaml.tmp", facet.key()));
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;

        debug!(session_id = %id, %facet, path = %path.display(), "Wrote session facet");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get_history(&self, id: &SessionId) -> Result<History, SessionStoreError> {
        Ok(self.load(id, Facet::History).await?.unwrap_or_default())
    }

    async fn put_history(&self, id: &SessionId, history: &History) -> Result<(), SessionStoreError> {
        self.save(id, Facet::History, history).await
    }

    async fn get_profile(&self, id: &SessionId) -> Result<Option<UserProfile>, SessionStoreError> {
        self.load(id, Facet::Profile).await
    }

    async fn put_profile(
        &self,
        id: &SessionId,
        profile: &UserProfile,
    ) -> Result<(), SessionStoreError> {
        self.save(id, Facet::Profile, profile).await
    }

    async fn get_counseling_state(
        &self,
        id: &SessionId,
    ) -> Result<CounselingState, SessionStoreError> {
        Ok(self
            .load(id, Facet::CounselingState)
            .await?
            .unwrap_or_default())
    }

    async fn put_counseling_state(
        &self,
        id: &SessionId,
        state: &CounselingState,
    ) -> Result<(), SessionStoreError> {
        self.save(id, Facet::CounselingState, state).await
    }

    async fn get_selected_experts(
        &self,
        id: &SessionId,
    ) -> Result<Option<SelectedExperts>, SessionStoreError> {
        self.load(id, Facet::SelectedExperts).await
    }

    async fn put_selected_experts(
        &self,
        id: &SessionId,
        experts: &SelectedExperts,
    ) -> Result<(), SessionStoreError> {
        self.save(id, Facet::SelectedExperts, experts).await
    }

    async fn purge(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        match fs::remove_dir_all(self.session_dir(id)).await {
            Ok(()) => {
                debug!(session_id = %id, "Purged session directory");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionStoreError::Io(e.to_string())),
        }
    }
}
