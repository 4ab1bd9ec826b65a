use std::collections::HashMap;

use async_trait::async_trait;
use planora_application::{PersistedSession, SessionRepository, TokenPair};
use tokio::sync::RwLock;

use crate::{SESSION_KEY, TOKEN_KEY, TOKENS_KEY};

/// In-memory session repository implementation.
///
/// Backs the `memory` session backend and tests; keeps the same logical key
/// layout as the Redis adapter so precedence behavior matches.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySessionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Seeds a raw entry, bypassing the typed write path.
    ///
    /// Test hook for exercising read precedence over legacy layouts.
    pub async fn seed_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().await.insert(key.into(), value.into());
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn read_token(&self) -> Option<String> {
        let entries = self.entries.read().await;

        // Structured record first; a malformed record falls through to the
        // plain mirror rather than erroring.
        if let Some(raw) = entries.get(TOKENS_KEY)
            && let Ok(pair) = serde_json::from_str::<TokenPair>(raw)
        {
            return Some(pair.access_token);
        }

        entries.get(TOKEN_KEY).cloned()
    }

    async fn write_token(&self, pair: &TokenPair) {
        let Ok(encoded) = serde_json::to_string(pair) else {
            return;
        };

        let mut entries = self.entries.write().await;
        entries.insert(TOKENS_KEY.to_owned(), encoded);
        entries.insert(TOKEN_KEY.to_owned(), pair.access_token.clone());
    }

    async fn clear_token(&self) {
        let mut entries = self.entries.write().await;
        entries.remove(TOKENS_KEY);
        entries.remove(TOKEN_KEY);
    }

    async fn read_session(&self) -> Option<PersistedSession> {
        let entries = self.entries.read().await;
        let raw = entries.get(SESSION_KEY)?;
        serde_json::from_str(raw).ok()
    }

    async fn write_session(&self, session: &PersistedSession) {
        let Ok(encoded) = serde_json::to_string(session) else {
            return;
        };

        self.entries
            .write()
            .await
            .insert(SESSION_KEY.to_owned(), encoded);
    }

    async fn clear_session(&self) {
        self.entries.write().await.remove(SESSION_KEY);
    }
}

#[cfg(test)]
mod tests {
    use planora_application::{PersistedSession, SessionRepository, TokenPair};
    use planora_core::AppResult;
    use planora_domain::{User, UserId};

    use super::InMemorySessionRepository;

    #[tokio::test]
    async fn structured_record_takes_precedence_over_plain_mirror() {
        let repository = InMemorySessionRepository::new();
        repository
            .seed_raw("auth_tokens", "{\"accessToken\":\"structured\"}")
            .await;
        repository.seed_raw("auth_token", "plain").await;

        assert_eq!(
            repository.read_token().await,
            Some("structured".to_owned())
        );
    }

    #[tokio::test]
    async fn plain_mirror_is_the_fallback() {
        let repository = InMemorySessionRepository::new();
        repository.seed_raw("auth_token", "plain").await;

        assert_eq!(repository.read_token().await, Some("plain".to_owned()));
    }

    #[tokio::test]
    async fn malformed_structured_record_falls_through_to_plain() {
        let repository = InMemorySessionRepository::new();
        repository.seed_raw("auth_tokens", "{not json").await;
        repository.seed_raw("auth_token", "plain").await;

        assert_eq!(repository.read_token().await, Some("plain".to_owned()));
    }

    #[tokio::test]
    async fn write_token_keeps_both_forms_in_sync() {
        let repository = InMemorySessionRepository::new();
        let pair = TokenPair {
            access_token: "tok".to_owned(),
            refresh_token: Some("refresh".to_owned()),
        };

        repository.write_token(&pair).await;
        assert_eq!(repository.read_token().await, Some("tok".to_owned()));

        repository.clear_token().await;
        assert_eq!(repository.read_token().await, None);
    }

    #[tokio::test]
    async fn session_record_round_trips() -> AppResult<()> {
        let repository = InMemorySessionRepository::new();
        let session = PersistedSession {
            is_authenticated: true,
            token: "tok".to_owned(),
            user: User::new(UserId::new(42), "jsmith", "Jan Smith")?,
        };

        repository.write_session(&session).await;
        assert_eq!(repository.read_session().await, Some(session));

        repository.clear_session().await;
        assert!(repository.read_session().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn empty_repository_reads_absent() {
        let repository = InMemorySessionRepository::new();
        assert_eq!(repository.read_token().await, None);
        assert!(repository.read_session().await.is_none());
    }
}
