//! Handlers for the `/articles` resource.
//!
//! Articles are addressed by their external code, not the internal id.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use knowmaint_core::error::CoreError;
use knowmaint_core::policy::{self, Action, Resource};
use knowmaint_core::validation::{require_non_empty, require_non_empty_opt};
use knowmaint_db::models::article::{CreateArticle, UpdateArticle};
use knowmaint_db::repositories::ArticleRepo;

use crate::error::AppResult;
use crate::handlers::groups::ensure_group_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/articles
///
/// 409 when the code or display name is already taken.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateArticle>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;
    require_non_empty("code", &input.code)?;
    require_non_empty("name", &input.name)?;
    ensure_group_exists(&state.pool, input.approval_group_id).await?;

    let article = ArticleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        article_code = %article.code,
        approval_group_id = article.approval_group_id,
        "Article created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: article })))
}

/// GET /api/v1/articles
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let articles = ArticleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: articles }))
}

/// GET /api/v1/articles/{code}
pub async fn get_by_code(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let article = ArticleRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| CoreError::not_found("Article", &code))?;
    Ok(Json(DataResponse { data: article }))
}

/// PUT /api/v1/articles/{code}
///
/// A new code cascades to the proposals filed against the article. A new
/// approval group applies to proposals filed from now on.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(input): Json<UpdateArticle>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;
    require_non_empty_opt("code", input.code.as_deref())?;
    require_non_empty_opt("name", input.name.as_deref())?;
    if let Some(group_id) = input.approval_group_id {
        ensure_group_exists(&state.pool, group_id).await?;
    }

    let article = ArticleRepo::update(&state.pool, &code, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Article", &code))?;

    tracing::info!(
        user_id = auth.user_id,
        article_code = %article.code,
        previous_code = %code,
        "Article updated"
    );

    Ok(Json(DataResponse { data: article }))
}

/// DELETE /api/v1/articles/{code}
///
/// 409 while proposals still reference the article.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<StatusCode> {
    policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;

    if !ArticleRepo::delete(&state.pool, &code).await? {
        return Err(CoreError::not_found("Article", &code).into());
    }

    tracing::info!(user_id = auth.user_id, article_code = %code, "Article deleted");

    Ok(StatusCode::NO_CONTENT)
}
