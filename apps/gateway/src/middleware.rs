use axum::Extension;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use planora_application::{AccessDecision, AccessGate, GateRequirement};
use planora_domain::{EdgeDecision, decide_edge};
use tracing::debug;

use crate::auth::AUTH_COOKIE;
use crate::state::AppState;

/// Edge guard: runs on every incoming request, before any handler.
///
/// Inspects nothing but the request cookie and the path classification; it
/// never touches the session state or the backend. Presence only: an expired
/// token passes here and is caught by [`require_access`].
pub async fn edge_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let token_present = jar
        .get(AUTH_COOKIE)
        .is_some_and(|cookie| !cookie.value().is_empty());
    let class = state.route_policy.classify(request.uri().path());

    match decide_edge(token_present, class) {
        EdgeDecision::Continue => next.run(request).await,
        EdgeDecision::RedirectToLanding => {
            debug!(path = request.uri().path(), "edge guard: already signed in");
            Redirect::temporary(&state.route_policy.landing_route).into_response()
        }
        EdgeDecision::RedirectToLogin => {
            debug!(path = request.uri().path(), "edge guard: session required");
            Redirect::temporary(&state.route_policy.login_route).into_response()
        }
    }
}

/// Access gate: re-checks the full session state for a protected subtree.
///
/// The requirement is attached per route group via an [`Extension`] layer;
/// each request takes a fresh snapshot, so a role revoked mid-session
/// forbids the very next request.
pub async fn require_access(
    State(state): State<AppState>,
    Extension(requirement): Extension<GateRequirement>,
    request: Request,
    next: Next,
) -> Response {
    let gate = AccessGate::new(state.sessions.clone(), requirement);

    match gate.decide().await {
        AccessDecision::Grant => next.run(request).await,
        AccessDecision::RequireLogin => {
            Redirect::temporary(&state.route_policy.login_route).into_response()
        }
        AccessDecision::Forbid => {
            debug!(path = request.uri().path(), "access gate: required role missing");
            Redirect::temporary(&state.route_policy.forbidden_route).into_response()
        }
    }
}
