use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use planora_application::TokenPair;
use planora_core::AppError;
use planora_domain::{User, is_valid};
use time::Duration;
use tracing::info;

use crate::dto::{LoginRequest, SessionResponse, UpdateProfileRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// Cookie mirroring the bearer credential for the edge guard.
pub const AUTH_COOKIE: &str = "auth_token";

/// Mirror cookie lifetime: seven days.
const AUTH_COOKIE_MAX_AGE_SECONDS: i64 = 604_800;

fn auth_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(AUTH_COOKIE_MAX_AGE_SECONDS))
        .build()
}

fn expired_auth_cookie(secure: bool) -> Cookie<'static> {
    // Removal is expiry in the past; attributes must match the set cookie.
    Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<SessionResponse>)> {
    if !is_valid(&payload.access_token) {
        return Err(
            AppError::Unauthorized("access token is malformed or expired".to_owned()).into(),
        );
    }

    let user = User::try_from(payload.user)?;

    // Token first, then credentials: the session record snapshots the token
    // it was built from.
    state
        .session_repository
        .write_token(&TokenPair {
            access_token: payload.access_token.clone(),
            refresh_token: payload.refresh_token,
        })
        .await;
    let snapshot = state.sessions.set_credentials(user).await;

    if let Some(user) = snapshot.user() {
        info!(user_id = %user.id, "login");
    }

    let jar = jar.add(auth_cookie(payload.access_token, state.cookie_secure));
    Ok((jar, Json(SessionResponse::from_state(&snapshot))))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, StatusCode)> {
    state.sessions.logout().await;
    info!("logout");

    let jar = jar.add(expired_auth_cookie(state.cookie_secure));
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn me_handler(State(state): State<AppState>) -> ApiResult<Json<SessionResponse>> {
    let snapshot = state.sessions.snapshot().await;
    if !snapshot.is_authenticated() {
        return Err(AppError::Unauthorized("authentication required".to_owned()).into());
    }

    Ok(Json(SessionResponse::from_state(&snapshot)))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let snapshot = state.sessions.snapshot().await;
    if !snapshot.is_authenticated() {
        return Err(AppError::Unauthorized("authentication required".to_owned()).into());
    }

    let updated = state.sessions.update_user(payload.into()).await;
    Ok(Json(SessionResponse::from_state(&updated)))
}
