//! Handlers for the `/info-categories` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use knowmaint_core::error::CoreError;
use knowmaint_core::policy::{self, Action, Resource};
use knowmaint_core::types::DbId;
use knowmaint_core::validation::{require_non_empty, require_non_empty_opt};
use knowmaint_db::models::info_category::{CreateInfoCategory, UpdateInfoCategory};
use knowmaint_db::repositories::InfoCategoryRepo;
use knowmaint_db::DbPool;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

pub(crate) async fn ensure_info_category_exists(pool: &DbPool, id: DbId) -> AppResult<()> {
    InfoCategoryRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("InfoCategory", id))?;
    Ok(())
}

/// POST /api/v1/info-categories
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInfoCategory>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;
    require_non_empty("name", &input.name)?;

    let category = InfoCategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        info_category_id = category.id,
        "Info category created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/info-categories
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = InfoCategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/info-categories/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = InfoCategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("InfoCategory", id))?;
    Ok(Json(DataResponse { data: category }))
}

/// PUT /api/v1/info-categories/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInfoCategory>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;
    require_non_empty_opt("name", input.name.as_deref())?;

    let category = InfoCategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("InfoCategory", id))?;

    tracing::info!(user_id = auth.user_id, info_category_id = id, "Info category updated");

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/info-categories/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;

    if !InfoCategoryRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("InfoCategory", id).into());
    }

    tracing::info!(user_id = auth.user_id, info_category_id = id, "Info category deleted");

    Ok(StatusCode::NO_CONTENT)
}
