//! Handlers for the `/auth` resource (login, refresh, logout).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use knowmaint_core::error::CoreError;
use knowmaint_core::types::DbId;
use knowmaint_db::models::user::UserResponse;
use knowmaint_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, TokenKind};
use crate::auth::password::verify_password_or_dummy;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{verify_token, AuthUser};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Optional request body for `POST /auth/logout`.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Exchange username + password for an access/refresh token pair. An
/// unknown username and a wrong password get the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username).await?;

    let password_valid = verify_password_or_dummy(
        &input.password,
        user.as_ref().map(|u| u.password_hash.as_str()),
    )
    .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    let user = match user {
        Some(user) if password_valid => user,
        _ => {
            tracing::info!(username = %input.username, "Login failed");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            )));
        }
    };

    tracing::info!(user_id = user.id, "User logged in");

    let response = issue_token_pair(&state, user.id, UserResponse::from(user))?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new pair. The presented refresh token is
/// claimed atomically (rotation), so each refresh token works once even when
/// two refreshes race.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let claims = verify_token(&state, &input.refresh_token, TokenKind::Refresh).await?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let claimed = state
        .revocation
        .claim(&claims.jti, claims.revocation_ttl())
        .await?;
    if !claimed {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Token has been revoked".into(),
        )));
    }

    tracing::info!(user_id = user.id, "Token pair refreshed");

    let response = issue_token_pair(&state, user.id, UserResponse::from(user))?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke the presenting access token and, when the body carries one, the
/// caller's refresh token. Returns 204 No Content.
pub async fn logout(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<StatusCode> {
    let input: LogoutRequest = if body.is_empty() {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid logout body: {e}")))?
    };

    if let Some(refresh_token) = input.refresh_token {
        let refresh_claims = verify_token(&state, &refresh_token, TokenKind::Refresh).await?;
        if refresh_claims.sub != auth.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "Refresh token belongs to another user".into(),
            )));
        }
        state
            .revocation
            .revoke(&refresh_claims.jti, refresh_claims.revocation_ttl())
            .await?;
    }

    state
        .revocation
        .revoke(&auth.claims.jti, auth.claims.revocation_ttl())
        .await?;

    tracing::info!(user_id = auth.user_id, "User logged out");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn issue_token_pair(
    state: &AppState,
    user_id: DbId,
    user: UserResponse,
) -> AppResult<TokenResponse> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user_id, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh_token = generate_refresh_token(user_id, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
        expires_in: jwt.access_token_ttl_secs(),
        user,
    })
}
