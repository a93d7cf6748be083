//! Handlers for the `/users` resource (account management).
//!
//! Everything except `GET /users/me` is gated by [`Action::ManageUsers`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use knowmaint_core::error::CoreError;
use knowmaint_core::policy::{self, Action, Resource};
use knowmaint_core::roles::UserRole;
use knowmaint_core::types::DbId;
use knowmaint_core::validation::{
    require_non_empty, require_non_empty_opt, validate_email, validate_password,
};
use knowmaint_db::models::user::{CreateUser, UpdateUser, UserResponse};
use knowmaint_db::repositories::UserRepo;
use serde::Deserialize;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::handlers::groups::ensure_group_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub group_id: Option<DbId>,
}

/// Request body for `POST /users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageUsers, Resource::None)?;

    let username = require_non_empty("username", &input.username)?.to_string();
    validate_email(&input.email)?;
    validate_password(&input.password)?;
    if let Some(group_id) = input.group_id {
        ensure_group_exists(&state.pool, group_id).await?;
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email: input.email,
            password_hash,
            role: input.role,
            group_id: input.group_id,
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        new_user_id = user.id,
        role = %user.role,
        "User created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// GET /api/v1/users
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageUsers, Resource::None)?;

    let users: Vec<UserResponse> = UserRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/users/me
///
/// The caller's own account. Any authenticated user.
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageUsers, Resource::None)?;

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// PUT /api/v1/users/{id}
///
/// Update profile fields, role and group. Passwords go through
/// `reset-password`.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageUsers, Resource::None)?;

    require_non_empty_opt("username", input.username.as_deref())?;
    if let Some(email) = &input.email {
        validate_email(email)?;
    }
    if let Some(group_id) = input.group_id {
        ensure_group_exists(&state.pool, group_id).await?;
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;

    tracing::info!(user_id = auth.user_id, target_user_id = id, "User updated");

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// POST /api/v1/users/{id}/reset-password
pub async fn reset_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    policy::require(&auth.actor(), Action::ManageUsers, Resource::None)?;
    validate_password(&input.new_password)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &password_hash).await? {
        return Err(CoreError::not_found("User", id).into());
    }

    tracing::info!(user_id = auth.user_id, target_user_id = id, "Password reset");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/{id}
///
/// Fails with 409 while the user still owns or decided proposals.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    policy::require(&auth.actor(), Action::ManageUsers, Resource::None)?;

    if id == auth.user_id {
        return Err(CoreError::Validation("You cannot delete your own account".into()).into());
    }

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("User", id).into());
    }

    tracing::info!(user_id = auth.user_id, target_user_id = id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
