//! Redis-backed session store for multi-process deployments.
//!
//! Each facet is one JSON string under `{prefix}:{session_id}:{facet}`.
//! An optional TTL is refreshed on every write so idle sessions expire.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::domain::counseling::{CounselingState, History, SelectedExperts, UserProfile};
use crate::domain::foundation::SessionId;
use crate::ports::{Facet, SessionStore, SessionStoreError};

/// Default key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "counsel";

/// Redis-backed session store.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    prefix: String,
    ttl_secs: Option<i64>,
}

impl RedisSessionStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl_secs: None,
        }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend)?;
        Ok(Self::new(conn))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Expire all facets of a session after `ttl_secs` without writes.
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = Some(ttl_secs as i64);
        self
    }

    async fn load<T: DeserializeOwned>(
        &self,
        id: &SessionId,
        facet: Facet,
    ) -> Result<Option<T>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(facet_key(&self.prefix, id, facet))
            .await
            .map_err(backend)?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| SessionStoreError::deserialization(facet, e))
        })
        .transpose()
    }

    async fn save<T: Serialize>(
        &self,
        id: &SessionId,
        facet: Facet,
        value: &T,
    ) -> Result<(), SessionStoreError> {
        let json =
            serde_json::to_string(value).map_err(|e| SessionStoreError::serialization(facet, e))?;
        let key = facet_key(&self.prefix, id, facet);

        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(&key, json).await.map_err(backend)?;

        if let Some(ttl) = self.ttl_secs {
            for facet in Facet::ALL {
                conn.expire::<_, ()>(facet_key(&self.prefix, id, facet), ttl)
                    .await
                    .map_err(backend)?;
            }
        }

        debug!(session_id = %id, %facet, key = %key, "Wrote session facet");
        Ok(())
    }
}

fn facet_key(prefix: &str, id: &SessionId, facet: Facet) -> String {
    format!("{}:{}:{}", prefix, id, facet.key())
}

fn backend(err: redis::RedisError) -> SessionStoreError {
    SessionStoreError::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
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
        let keys: Vec<String> = Facet::ALL
            .iter()
            .map(|facet| facet_key(&self.prefix, id, *facet))
            .collect();

        let mut conn = self.conn.clone();
        conn.del::<_, ()>(keys).await.map_err(backend)?;
        debug!(session_id = %id, "Purged session keys");
        Ok(())
    }
}
