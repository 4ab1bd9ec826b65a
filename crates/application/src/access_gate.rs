use std::sync::Arc;

use planora_domain::{RoleCode, has_all_roles, has_any_role};
use tokio::sync::watch;

use crate::auth_session_service::{AuthSessionService, AuthState};

/// Role requirement attached to a protected subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequirement {
    /// Roles consulted by the gate; empty means a session alone suffices.
    pub required_roles: Vec<RoleCode>,
    /// When true (the default), one matching role suffices; when false, all
    /// listed roles are required.
    pub require_any: bool,
}

impl Default for GateRequirement {
    fn default() -> Self {
        Self {
            required_roles: Vec::new(),
            require_any: true,
        }
    }
}

impl GateRequirement {
    /// Requires a session but no particular role.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Requires at least one of the given roles.
    #[must_use]
    pub fn any_of(roles: impl Into<Vec<RoleCode>>) -> Self {
        Self {
            required_roles: roles.into(),
            require_any: true,
        }
    }

    /// Requires every one of the given roles.
    #[must_use]
    pub fn all_of(roles: impl Into<Vec<RoleCode>>) -> Self {
        Self {
            required_roles: roles.into(),
            require_any: false,
        }
    }
}

/// Outcome of gating a protected subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the protected content.
    Grant,
    /// No session: send the caller to the login screen.
    RequireLogin,
    /// Session present but a required role is missing.
    Forbid,
}

/// Evaluates a gate requirement against a state snapshot.
///
/// The session check runs before the role predicate, so an anonymous caller
/// is always redirected to login rather than forbidden.
#[must_use]
pub fn evaluate_gate(state: &AuthState, requirement: &GateRequirement) -> AccessDecision {
    if !state.is_authenticated() {
        return AccessDecision::RequireLogin;
    }

    if !requirement.required_roles.is_empty() {
        let permitted = if requirement.require_any {
            has_any_role(state.user(), &requirement.required_roles)
        } else {
            has_all_roles(state.user(), &requirement.required_roles)
        };

        if !permitted {
            return AccessDecision::Forbid;
        }
    }

    AccessDecision::Grant
}

/// Render-layer guard coupling a requirement to the live session state.
///
/// Unlike the edge guard this re-checks the full state, not token presence,
/// and it is re-evaluated per request and on every published state change,
/// so a role revoked mid-session forbids the next evaluation.
#[derive(Clone)]
pub struct AccessGate {
    sessions: Arc<AuthSessionService>,
    requirement: GateRequirement,
}

impl AccessGate {
    /// Creates a gate for one protected subtree.
    #[must_use]
    pub fn new(sessions: Arc<AuthSessionService>, requirement: GateRequirement) -> Self {
        Self {
            sessions,
            requirement,
        }
    }

    /// Evaluates the requirement against the current snapshot.
    pub async fn decide(&self) -> AccessDecision {
        evaluate_gate(&self.sessions.snapshot().await, &self.requirement)
    }

    /// Subscribes to state changes for re-evaluation.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<AuthState> {
        self.sessions.subscribe()
    }
}
