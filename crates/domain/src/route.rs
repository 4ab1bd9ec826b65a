//! Route classification and the edge-layer redirect decision.

/// Classification of one request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Login and registration screens.
    PublicAuth,
    /// Requires an established session.
    Protected,
    /// No redirect rule applies.
    Unclassified,
}

/// Prefix tables and redirect targets driving the edge guard.
///
/// Matching is case-sensitive exact-prefix; the public-auth list is
/// consulted before the protected list.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    /// Prefixes classified as [`RouteClass::PublicAuth`].
    pub public_auth_prefixes: Vec<String>,
    /// Prefixes classified as [`RouteClass::Protected`].
    pub protected_prefixes: Vec<String>,
    /// Default landing route for an authenticated user.
    pub landing_route: String,
    /// Login screen route.
    pub login_route: String,
    /// Route shown when a required role is missing.
    pub forbidden_route: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            public_auth_prefixes: vec!["/auth/login".to_owned(), "/auth/register".to_owned()],
            protected_prefixes: vec!["/dashboard".to_owned()],
            landing_route: "/dashboard".to_owned(),
            login_route: "/auth/login".to_owned(),
            forbidden_route: "/forbidden".to_owned(),
        }
    }
}

impl RoutePolicy {
    /// Classifies a request path against the prefix tables.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if self
            .public_auth_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix))
        {
            return RouteClass::PublicAuth;
        }

        if self
            .protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix))
        {
            return RouteClass::Protected;
        }

        RouteClass::Unclassified
    }
}

/// Outcome of the edge guard for one incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Let the request proceed unmodified.
    Continue,
    /// Send an already-authenticated user away from the auth screens.
    RedirectToLanding,
    /// Send an unauthenticated user to the login screen.
    RedirectToLogin,
}

/// Edge-layer redirect rules, first match wins.
///
/// This layer sees only token *presence*: an expired-but-present token still
/// passes here, and validity is re-checked by the access gate and the API
/// boundary.
#[must_use]
pub fn decide_edge(token_present: bool, class: RouteClass) -> EdgeDecision {
    match (token_present, class) {
        (true, RouteClass::PublicAuth) => EdgeDecision::RedirectToLanding,
        (false, RouteClass::Protected) => EdgeDecision::RedirectToLogin,
        _ => EdgeDecision::Continue,
    }
}
