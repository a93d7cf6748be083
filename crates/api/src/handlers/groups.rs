//! Handlers for the `/groups` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use knowmaint_core::error::CoreError;
use knowmaint_core::policy::{self, Action, Resource};
use knowmaint_core::types::DbId;
use knowmaint_core::validation::{require_non_empty, require_non_empty_opt};
use knowmaint_db::models::group::{CreateGroup, UpdateGroup};
use knowmaint_db::repositories::GroupRepo;
use knowmaint_db::DbPool;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// 404 unless a group with `id` exists.
pub(crate) async fn ensure_group_exists(pool: &DbPool, id: DbId) -> AppResult<()> {
    GroupRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Group", id))?;
    Ok(())
}

/// POST /api/v1/groups
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateGroup>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;
    require_non_empty("name", &input.name)?;

    let group = GroupRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = auth.user_id, group_id = group.id, "Group created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: group })))
}

/// GET /api/v1/groups
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let groups = GroupRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// GET /api/v1/groups/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Group", id))?;
    Ok(Json(DataResponse { data: group }))
}

/// PUT /api/v1/groups/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGroup>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;
    require_non_empty_opt("name", input.name.as_deref())?;

    let group = GroupRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Group", id))?;

    tracing::info!(user_id = auth.user_id, group_id = id, "Group updated");

    Ok(Json(DataResponse { data: group }))
}

/// DELETE /api/v1/groups/{id}
///
/// 409 while users, articles or proposals still reference the group.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;

    if !GroupRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Group", id).into());
    }

    tracing::info!(user_id = auth.user_id, group_id = id, "Group deleted");

    Ok(StatusCode::NO_CONTENT)
}
