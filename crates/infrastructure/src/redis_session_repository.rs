//! Redis-backed session repository.

use async_trait::async_trait;
use planora_application::{PersistedSession, SessionRepository, TokenPair};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::warn;

use crate::{SESSION_KEY, TOKEN_KEY, TOKENS_KEY};

/// Redis implementation of the session repository port.
///
/// Honors the port's degradation contract: any Redis fault is logged and
/// surfaced as "absent", never as an error, so guards fall back to the
/// signed-out path instead of failing the request.
#[derive(Clone)]
pub struct RedisSessionRepository {
    client: redis::Client,
    key_prefix: String,
}

impl RedisSessionRepository {
    /// Creates a repository with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        match self.client.get_multiplexed_async_connection().await {
            Ok(connection) => Some(connection),
            Err(error) => {
                warn!(%error, "failed to connect to redis, treating session storage as absent");
                None
            }
        }
    }

    async fn read_raw(&self, key: &str) -> Option<String> {
        let mut connection = self.connection().await?;
        match connection.get::<_, Option<String>>(self.key_for(key)).await {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, key, "redis read failed, treating entry as absent");
                None
            }
        }
    }

    async fn write_raw(&self, key: &str, value: &str) {
        let Some(mut connection) = self.connection().await else {
            return;
        };

        if let Err(error) = connection.set::<_, _, ()>(self.key_for(key), value).await {
            warn!(%error, key, "redis write failed, entry not persisted");
        }
    }

    async fn delete_raw(&self, keys: &[&str]) {
        let Some(mut connection) = self.connection().await else {
            return;
        };

        let prefixed: Vec<String> = keys.iter().map(|key| self.key_for(key)).collect();
        if let Err(error) = connection.del::<_, ()>(prefixed).await {
            warn!(%error, "redis delete failed, entries may linger until overwritten");
        }
    }
}

#[async_trait]
impl SessionRepository for RedisSessionRepository {
    async fn read_token(&self) -> Option<String> {
        if let Some(raw) = self.read_raw(TOKENS_KEY).await
            && let Ok(pair) = serde_json::from_str::<TokenPair>(&raw)
        {
            return Some(pair.access_token);
        }

        self.read_raw(TOKEN_KEY).await
    }

    async fn write_token(&self, pair: &TokenPair) {
        let Ok(encoded) = serde_json::to_string(pair) else {
            return;
        };

        self.write_raw(TOKENS_KEY, &encoded).await;
        self.write_raw(TOKEN_KEY, &pair.access_token).await;
    }

    async fn clear_token(&self) {
        self.delete_raw(&[TOKENS_KEY, TOKEN_KEY]).await;
    }

    async fn read_session(&self) -> Option<PersistedSession> {
        let raw = self.read_raw(SESSION_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                warn!(%error, "persisted session record is malformed, ignoring it");
                None
            }
        }
    }

    async fn write_session(&self, session: &PersistedSession) {
        let Ok(encoded) = serde_json::to_string(session) else {
            return;
        };

        self.write_raw(SESSION_KEY, &encoded).await;
    }

    async fn clear_session(&self) {
        self.delete_raw(&[SESSION_KEY]).await;
    }
}
