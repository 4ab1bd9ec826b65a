use std::sync::Arc;

use planora_application::{AuthSessionService, SessionRepository};
use planora_domain::RoutePolicy;

/// Shared gateway state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<AuthSessionService>,
    pub session_repository: Arc<dyn SessionRepository>,
    pub route_policy: Arc<RoutePolicy>,
    pub cookie_secure: bool,
}
