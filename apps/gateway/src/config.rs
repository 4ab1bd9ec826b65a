use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use planora_core::AppError;
use planora_domain::RoutePolicy;
use tracing_subscriber::EnvFilter;

/// Session persistence backend selection.
#[derive(Debug, Clone)]
pub enum SessionBackendConfig {
    /// Process-local storage; sessions die with the gateway.
    Memory,
    /// Redis-backed storage shared across gateway instances.
    Redis { url: String, key_prefix: String },
}

/// Gateway runtime configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub gateway_host: String,
    pub gateway_port: u16,
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub session_backend: SessionBackendConfig,
    pub route_policy: RoutePolicy,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let gateway_host = env::var("GATEWAY_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let gateway_port = env::var("GATEWAY_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let cookie_secure = env::var("AUTH_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let session_backend = match env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => SessionBackendConfig::Memory,
            "redis" => SessionBackendConfig::Redis {
                url: required_non_empty_env("REDIS_URL")?,
                key_prefix: env::var("SESSION_KEY_PREFIX")
                    .unwrap_or_else(|_| "planora:session".to_owned()),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "SESSION_BACKEND must be either 'memory' or 'redis', got '{other}'"
                )));
            }
        };

        let mut route_policy = RoutePolicy::default();
        if let Some(prefixes) = route_list_env("PUBLIC_AUTH_ROUTES") {
            route_policy.public_auth_prefixes = prefixes;
        }
        if let Some(prefixes) = route_list_env("PROTECTED_ROUTES") {
            route_policy.protected_prefixes = prefixes;
        }
        if let Ok(route) = env::var("LANDING_ROUTE") {
            route_policy.landing_route = route;
        }
        if let Ok(route) = env::var("LOGIN_ROUTE") {
            route_policy.login_route = route;
        }
        if let Ok(route) = env::var("FORBIDDEN_ROUTE") {
            route_policy.forbidden_route = route;
        }

        Ok(Self {
            gateway_host,
            gateway_port,
            frontend_url,
            cookie_secure,
            session_backend,
            route_policy,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.gateway_host).map_err(|error| {
            AppError::Internal(format!(
                "invalid GATEWAY_HOST '{}': {error}",
                self.gateway_host
            ))
        })?;
        Ok(SocketAddr::from((host, self.gateway_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn route_list_env(name: &str) -> Option<Vec<String>> {
    let raw = env::var(name).ok()?;
    let routes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|route| !route.is_empty())
        .map(str::to_owned)
        .collect();

    (!routes.is_empty()).then_some(routes)
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
