use async_trait::async_trait;
use planora_domain::User;
use serde::{Deserialize, Serialize};

/// Structured credential record persisted under the `auth_tokens` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Bearer credential sent with API requests.
    pub access_token: String,
    /// Optional refresh credential; carried through, never inspected here.
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// Creates a pair holding only an access token.
    #[must_use]
    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }
}

/// Session record persisted under the `auth` key on every credential change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// Mirrors the in-memory authenticated flag.
    pub is_authenticated: bool,
    /// Access token at the time the record was written.
    pub token: String,
    /// Authoritative user copy; roles are recomputed on restore, not trusted.
    pub user: User,
}

/// Port for the persisted credential and session records.
///
/// Implementations never fail loudly: a storage fault (quota, disabled
/// backend, lost connection) degrades reads to `None` and writes to no-ops,
/// so guard logic upstream always sees "absent" rather than an error.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Reads the persisted access token.
    ///
    /// Precedence: the structured `auth_tokens` record's access token first,
    /// then the plain `auth_token` string fallback.
    async fn read_token(&self) -> Option<String>;

    /// Persists the structured record and the plain-string mirror together.
    async fn write_token(&self, pair: &TokenPair);

    /// Removes both persisted token forms.
    async fn clear_token(&self);

    /// Reads the persisted session record.
    async fn read_session(&self) -> Option<PersistedSession>;

    /// Persists the session record.
    async fn write_session(&self, session: &PersistedSession);

    /// Removes the persisted session record.
    async fn clear_session(&self);
}
