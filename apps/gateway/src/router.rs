use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use planora_application::GateRequirement;
use planora_core::AppError;
use planora_domain::RoleCode;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let session_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard_handler))
        .route(
            "/dashboard/projects/{project_id}",
            get(handlers::project_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_access,
        ))
        .layer(axum::Extension(GateRequirement::authenticated()));

    let payroll_routes = Router::new()
        .route("/dashboard/payroll", get(handlers::payroll_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_access,
        ))
        .layer(axum::Extension(GateRequirement::any_of([
            RoleCode::Accountant,
            RoleCode::Manager,
        ])));

    let admin_routes = Router::new()
        .route("/dashboard/admin", get(handlers::admin_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_access,
        ))
        .layer(axum::Extension(GateRequirement::all_of([
            RoleCode::Manager,
            RoleCode::ContentAdmin,
        ])));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/auth/login",
            get(handlers::login_screen_handler).post(auth::login_handler),
        )
        .route("/auth/register", get(handlers::register_screen_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/api/profile", put(auth::update_profile_handler))
        .route("/forbidden", get(handlers::forbidden_handler))
        .merge(session_routes)
        .merge(payroll_routes)
        .merge(admin_routes)
        .layer(from_fn_with_state(app_state.clone(), middleware::edge_guard))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
