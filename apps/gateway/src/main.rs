//! Planora gateway composition root.

#![forbid(unsafe_code)]

mod auth;
mod config;
mod dto;
mod error;
mod handlers;
mod middleware;
mod router;
mod state;

use std::sync::Arc;

use planora_application::{AuthSessionService, SessionRepository};
use planora_core::AppError;
use planora_infrastructure::{InMemorySessionRepository, RedisSessionRepository};
use tracing::info;

use crate::config::{GatewayConfig, SessionBackendConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    config::init_tracing();

    let config = GatewayConfig::load()?;

    let session_repository: Arc<dyn SessionRepository> = match &config.session_backend {
        SessionBackendConfig::Memory => Arc::new(InMemorySessionRepository::new()),
        SessionBackendConfig::Redis { url, key_prefix } => {
            let client = redis::Client::open(url.as_str())
                .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;
            Arc::new(RedisSessionRepository::new(client, key_prefix.clone()))
        }
    };

    let sessions = Arc::new(AuthSessionService::new(session_repository.clone()));

    // Hydrate exactly once, before the first request reaches a guard.
    let restored = sessions.restore().await;
    if restored.is_authenticated() {
        info!("restored persisted session");
    }

    let app_state = AppState {
        sessions,
        session_repository,
        route_policy: Arc::new(config.route_policy.clone()),
        cookie_secure: config.cookie_secure,
    };

    let app = router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "planora-gateway listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("gateway server error: {error}")))
}
