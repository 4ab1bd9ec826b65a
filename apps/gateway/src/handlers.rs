//! Page-shell handlers behind the guards.
//!
//! The real front-end renders these screens; the gateway answers with small
//! JSON stubs so both guard layers have a surface to protect.

use axum::Json;
use axum::extract::Path;
use serde::Serialize;
use ts_rs::TS;

/// Minimal screen descriptor returned by the shell routes.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ScreenResponse {
    screen: &'static str,
}

impl ScreenResponse {
    fn new(screen: &'static str) -> Json<Self> {
        Json(Self { screen })
    }
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn login_screen_handler() -> Json<ScreenResponse> {
    ScreenResponse::new("login")
}

pub async fn register_screen_handler() -> Json<ScreenResponse> {
    ScreenResponse::new("register")
}

pub async fn forbidden_handler() -> Json<ScreenResponse> {
    ScreenResponse::new("forbidden")
}

pub async fn dashboard_handler() -> Json<ScreenResponse> {
    ScreenResponse::new("dashboard")
}

pub async fn project_handler(Path(project_id): Path<i64>) -> Json<ScreenResponse> {
    tracing::debug!(project_id, "project screen requested");
    ScreenResponse::new("project")
}

pub async fn payroll_handler() -> Json<ScreenResponse> {
    ScreenResponse::new("payroll")
}

pub async fn admin_handler() -> Json<ScreenResponse> {
    ScreenResponse::new("admin")
}
