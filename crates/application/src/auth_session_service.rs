use std::collections::BTreeSet;
use std::sync::Arc;

use planora_domain::{RoleCode, User, UserUpdate, resolve_roles};
use tokio::sync::{Mutex, watch};

use crate::session_ports::{PersistedSession, SessionRepository};

/// Snapshot of the process-wide authentication state.
///
/// Construction goes through [`AuthState::signed_in`] and
/// [`AuthState::signed_out`] only, which uphold two invariants for every
/// reachable value: the authenticated flag equals user presence, and the
/// cached role set is exactly the resolved projection of the user's grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    is_authenticated: bool,
    user: Option<User>,
    roles: BTreeSet<RoleCode>,
    generation: u64,
}

impl AuthState {
    pub(crate) fn signed_out(generation: u64) -> Self {
        Self {
            is_authenticated: false,
            user: None,
            roles: BTreeSet::new(),
            generation,
        }
    }

    pub(crate) fn signed_in(user: User, generation: u64) -> Self {
        let roles = resolve_roles(Some(&user));
        Self {
            is_authenticated: true,
            user: Some(user),
            roles,
            generation,
        }
    }

    /// Returns whether a user is currently signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns the cached role projection of the signed-in user.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<RoleCode> {
        &self.roles
    }

    /// Returns the credential generation.
    ///
    /// The generation increases on every login and logout; a response from a
    /// request issued under an older generation should be discarded as stale.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Process-wide source of truth for "who is signed in and what roles do they
/// hold", mutated only through the transitions below.
///
/// All transitions serialize through one internal mutex, so hosts with
/// concurrent request handlers keep the single-writer discipline without any
/// caller-side locking. Every transition publishes the resulting snapshot on
/// a watch channel so render-layer gates re-evaluate on each state change.
pub struct AuthSessionService {
    repository: Arc<dyn SessionRepository>,
    state: Mutex<AuthState>,
    updates: watch::Sender<AuthState>,
}

impl AuthSessionService {
    /// Creates a service starting in the signed-out state.
    #[must_use]
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        let initial = AuthState::signed_out(0);
        let (updates, _) = watch::channel(initial.clone());
        Self {
            repository,
            state: Mutex::new(initial),
            updates,
        }
    }

    /// Returns the current state snapshot.
    pub async fn snapshot(&self) -> AuthState {
        self.state.lock().await.clone()
    }

    /// Subscribes to state snapshots published after every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.updates.subscribe()
    }

    /// Returns whether the given generation is still the live one.
    pub async fn is_current(&self, generation: u64) -> bool {
        self.state.lock().await.generation == generation
    }

    /// Signs a user in and persists the session record.
    ///
    /// Token persistence is the earlier `write_token` step of the login flow;
    /// this transition only records which token the session was built from.
    pub async fn set_credentials(&self, user: User) -> AuthState {
        let mut state = self.state.lock().await;
        let generation = state.generation + 1;
        *state = AuthState::signed_in(user.clone(), generation);

        let token = self.repository.read_token().await.unwrap_or_default();
        self.repository
            .write_session(&PersistedSession {
                is_authenticated: true,
                token,
                user,
            })
            .await;

        self.publish(&state)
    }

    /// Rebuilds state from the persisted token and session record.
    ///
    /// Populates the signed-in state only when both are present; roles are
    /// recomputed from the persisted user rather than trusted from storage.
    /// Idempotent, and a no-op when either record is missing. The composition
    /// root runs this once before any guard makes a decision.
    pub async fn restore(&self) -> AuthState {
        let mut state = self.state.lock().await;

        let token = self.repository.read_token().await;
        let session = self.repository.read_session().await;
        if let (Some(_), Some(session)) = (token, session) {
            let generation = state.generation;
            *state = AuthState::signed_in(session.user, generation);
        }

        self.publish(&state)
    }

    /// Shallow-merges profile fields into the signed-in user.
    ///
    /// No-op when signed out. Does not advance the generation: the credential
    /// is unchanged, only profile data moved.
    pub async fn update_user(&self, update: UserUpdate) -> AuthState {
        let mut state = self.state.lock().await;

        let Some(mut user) = state.user.clone() else {
            return state.clone();
        };

        user.apply(update);
        let generation = state.generation;
        *state = AuthState::signed_in(user.clone(), generation);

        let token = self.repository.read_token().await.unwrap_or_default();
        self.repository
            .write_session(&PersistedSession {
                is_authenticated: true,
                token,
                user,
            })
            .await;

        self.publish(&state)
    }

    /// Signs out and removes the persisted token and session record.
    pub async fn logout(&self) -> AuthState {
        let mut state = self.state.lock().await;
        let generation = state.generation + 1;
        *state = AuthState::signed_out(generation);

        self.repository.clear_token().await;
        self.repository.clear_session().await;

        self.publish(&state)
    }

    fn publish(&self, state: &AuthState) -> AuthState {
        self.updates.send_replace(state.clone());
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use planora_core::AppResult;
    use planora_domain::{RoleCode, RoleGrant, User, UserId, UserUpdate, resolve_roles};
    use tokio::sync::Mutex;

    use crate::session_ports::{PersistedSession, SessionRepository, TokenPair};

    use super::{AuthSessionService, AuthState};

    #[derive(Default)]
    struct FakeSessionRepository {
        token: Mutex<Option<TokenPair>>,
        session: Mutex<Option<PersistedSession>>,
    }

    #[async_trait]
    impl SessionRepository for FakeSessionRepository {
        async fn read_token(&self) -> Option<String> {
            self.token
                .lock()
                .await
                .as_ref()
                .map(|pair| pair.access_token.clone())
        }

        async fn write_token(&self, pair: &TokenPair) {
            *self.token.lock().await = Some(pair.clone());
        }

        async fn clear_token(&self) {
            *self.token.lock().await = None;
        }

        async fn read_session(&self) -> Option<PersistedSession> {
            self.session.lock().await.clone()
        }

        async fn write_session(&self, session: &PersistedSession) {
            *self.session.lock().await = Some(session.clone());
        }

        async fn clear_session(&self) {
            *self.session.lock().await = None;
        }
    }

    /// Storage that lost its backend: reads are absent, writes vanish.
    struct UnavailableSessionRepository;

    #[async_trait]
    impl SessionRepository for UnavailableSessionRepository {
        async fn read_token(&self) -> Option<String> {
            None
        }

        async fn write_token(&self, _pair: &TokenPair) {}

        async fn clear_token(&self) {}

        async fn read_session(&self) -> Option<PersistedSession> {
            None
        }

        async fn write_session(&self, _session: &PersistedSession) {}

        async fn clear_session(&self) {}
    }

    fn employee() -> AppResult<User> {
        let mut user = User::new(UserId::new(42), "jsmith", "Jan Smith")?;
        user.roles = vec![RoleGrant::known(RoleCode::Employee, "Employee")];
        Ok(user)
    }

    fn assert_invariants(state: &AuthState) {
        assert_eq!(state.is_authenticated(), state.user().is_some());
        assert_eq!(*state.roles(), resolve_roles(state.user()));
    }

    #[tokio::test]
    async fn set_credentials_signs_in_and_persists() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        repository.write_token(&TokenPair::access_only("tok")).await;
        let service = AuthSessionService::new(repository.clone());

        let state = service.set_credentials(employee()?).await;

        assert!(state.is_authenticated());
        assert!(state.roles().contains(&RoleCode::Employee));
        assert_invariants(&state);

        let persisted = repository.read_session().await;
        assert_eq!(persisted.map(|record| record.token), Some("tok".to_owned()));
        Ok(())
    }

    #[tokio::test]
    async fn restore_rebuilds_state_after_reload() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        repository.write_token(&TokenPair::access_only("tok")).await;

        let before = AuthSessionService::new(repository.clone());
        let at_login = before.set_credentials(employee()?).await;

        // Simulated reload: a fresh service over the same repository.
        let after = AuthSessionService::new(repository);
        let restored = after.restore().await;

        assert_eq!(restored.user(), at_login.user());
        assert_eq!(restored.roles(), at_login.roles());
        assert_invariants(&restored);
        Ok(())
    }

    #[tokio::test]
    async fn restore_is_idempotent() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        repository.write_token(&TokenPair::access_only("tok")).await;
        AuthSessionService::new(repository.clone())
            .set_credentials(employee()?)
            .await;

        let service = AuthSessionService::new(repository);
        let first = service.restore().await;
        let second = service.restore().await;

        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn restore_without_token_stays_signed_out() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        // Session record present but no token: both are required.
        repository
            .write_session(&PersistedSession {
                is_authenticated: true,
                token: String::new(),
                user: employee()?,
            })
            .await;

        let service = AuthSessionService::new(repository);
        let state = service.restore().await;

        assert!(!state.is_authenticated());
        assert_invariants(&state);
        Ok(())
    }

    #[tokio::test]
    async fn restore_without_session_record_stays_signed_out() {
        let repository = Arc::new(FakeSessionRepository::default());
        let service = AuthSessionService::new(repository.clone());
        repository.write_token(&TokenPair::access_only("tok")).await;

        let state = service.restore().await;
        assert!(!state.is_authenticated());
    }

    #[tokio::test]
    async fn update_user_merges_and_repersists() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        repository.write_token(&TokenPair::access_only("tok")).await;
        let service = AuthSessionService::new(repository.clone());
        let signed_in = service.set_credentials(employee()?).await;

        let updated = service
            .update_user(UserUpdate {
                display_name: Some("Jan A. Smith".to_owned()),
                ..UserUpdate::default()
            })
            .await;

        assert_eq!(
            updated.user().map(|user| user.display_name.as_str()),
            Some("Jan A. Smith")
        );
        assert_eq!(updated.generation(), signed_in.generation());
        assert_invariants(&updated);

        let persisted = repository.read_session().await;
        assert_eq!(
            persisted.map(|record| record.user.display_name),
            Some("Jan A. Smith".to_owned())
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_user_while_signed_out_is_a_no_op() {
        let service = AuthSessionService::new(Arc::new(FakeSessionRepository::default()));

        let state = service
            .update_user(UserUpdate {
                display_name: Some("Ghost".to_owned()),
                ..UserUpdate::default()
            })
            .await;

        assert!(!state.is_authenticated());
        assert_invariants(&state);
    }

    #[tokio::test]
    async fn role_change_is_reflected_in_resolved_set() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        repository.write_token(&TokenPair::access_only("tok")).await;
        let service = AuthSessionService::new(repository);
        service.set_credentials(employee()?).await;

        let state = service
            .update_user(UserUpdate {
                roles: Some(vec![RoleGrant::known(RoleCode::Accountant, "Accountant")]),
                ..UserUpdate::default()
            })
            .await;

        assert!(state.roles().contains(&RoleCode::Accountant));
        assert!(!state.roles().contains(&RoleCode::Employee));
        assert_invariants(&state);
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_state_and_storage() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        repository.write_token(&TokenPair::access_only("tok")).await;
        let service = AuthSessionService::new(repository.clone());
        service.set_credentials(employee()?).await;

        let state = service.logout().await;

        assert!(!state.is_authenticated());
        assert_invariants(&state);
        assert_eq!(repository.read_token().await, None);
        assert!(repository.read_session().await.is_none());

        // A later restore finds nothing to rebuild from.
        let restored = service.restore().await;
        assert!(!restored.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn generation_advances_on_login_and_logout_only() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        repository.write_token(&TokenPair::access_only("tok")).await;
        let service = AuthSessionService::new(repository);

        let signed_in = service.set_credentials(employee()?).await;
        assert_eq!(signed_in.generation(), 1);
        assert!(service.is_current(signed_in.generation()).await);

        let updated = service
            .update_user(UserUpdate {
                display_name: Some("Jan A. Smith".to_owned()),
                ..UserUpdate::default()
            })
            .await;
        assert_eq!(updated.generation(), 1);

        let signed_out = service.logout().await;
        assert_eq!(signed_out.generation(), 2);

        // A response captured under the login generation is now stale.
        assert!(!service.is_current(signed_in.generation()).await);
        Ok(())
    }

    #[tokio::test]
    async fn transitions_are_published_to_subscribers() -> AppResult<()> {
        let repository = Arc::new(FakeSessionRepository::default());
        repository.write_token(&TokenPair::access_only("tok")).await;
        let service = AuthSessionService::new(repository);
        let mut updates = service.subscribe();

        service.set_credentials(employee()?).await;

        updates
            .changed()
            .await
            .map_err(|_| planora_core::AppError::Internal("watch closed".to_owned()))?;
        assert!(updates.borrow().is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_storage_degrades_to_signed_out() -> AppResult<()> {
        let service = AuthSessionService::new(Arc::new(UnavailableSessionRepository));

        let restored = service.restore().await;
        assert!(!restored.is_authenticated());

        // Login still works in memory even when persistence is gone.
        let state = service.set_credentials(employee()?).await;
        assert!(state.is_authenticated());
        assert_invariants(&state);
        Ok(())
    }
}
