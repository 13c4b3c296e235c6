// handlers/public/auth.rs - POST /api/register, /api/auth/login, /api/auth/logout

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::{Identity, SESSION_COOKIE};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: Identity,
}

/// POST /api/register - Create an account
///
/// The configured super-admin email is approved on creation; anyone else
/// waits for an admin. Returns 201 with `{message, approved}`.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let account = state.accounts.register(&body.email, &body.password, &body.name).await?;

    Ok(ApiResponse::created(json!({
        "message": "User created successfully",
        "approved": account.approved,
    })))
}

/// POST /api/auth/login - Exchange credentials for a session
///
/// The token comes back in the body for API clients and as an HttpOnly
/// cookie for page navigation.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let account = state.accounts.authenticate(&body.email, &body.password).await?;

    let identity = account.identity();
    let token = state.sessions.issue(&identity).map_err(crate::services::ServiceError::from)?;
    let expires_in = state.sessions.expires_in_secs();
    let cookie = session_cookie(&state.config.security, &token, expires_in)?;

    info!(account = %identity.account_id, "Login");
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::success(LoginResponse {
            token,
            expires_in,
            user: identity,
        }),
    ))
}

/// POST /api/auth/logout - Clear the session cookie
///
/// Tokens are stateless; an already issued bearer token stays valid until it
/// expires.
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cookie = session_cookie(&state.config.security, "", 0)?;
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::success(json!({ "message": "Logged out" })),
    ))
}

fn session_cookie(security: &SecurityConfig, token: &str, max_age: u64) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if security.secure_cookies {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| {
        tracing::error!("Invalid session cookie: {}", e);
        ApiError::internal_server_error("Internal Server Error")
    })
}
