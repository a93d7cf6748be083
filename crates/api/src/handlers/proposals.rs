//! Handlers for the `/proposals` resource and its approval workflow.
//!
//! Reads are scoped by role through `knowmaint_core::visibility`; every
//! single-proposal operation asks `knowmaint_core::policy` first. Edits and
//! decisions run in one transaction that holds the proposal's row lock, so a
//! second concurrent decision observes the first one's terminal status.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use knowmaint_core::error::CoreError;
use knowmaint_core::policy::{self, Action, Resource};
use knowmaint_core::proposal::{
    check_rejection_invariant, ensure_pending, resolve_decision, validate_decision_target,
    ProposalStatus,
};
use knowmaint_core::types::DbId;
use knowmaint_core::validation::{require_non_empty, require_non_empty_opt, validate_publish_window};
use knowmaint_core::visibility::{ProposalFilter, ReviewScope};
use knowmaint_db::models::proposal::{CreateProposal, DecideProposal, Proposal, UpdateProposal};
use knowmaint_db::repositories::{ProposalBeforeRepo, ProposalRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::info_categories::ensure_info_category_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /proposals`.
#[derive(Debug, Deserialize)]
pub struct ListProposalsParams {
    pub status: Option<ProposalStatus>,
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

/// POST /api/v1/proposals
///
/// File a proposal against an article (by external code). The article's
/// display name and approval group are copied onto the proposal.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProposal>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::CreateProposal, Resource::None)?;

    require_non_empty("title", &input.title)?;
    require_non_empty("reason", &input.reason)?;
    validate_publish_window(input.published_start, input.published_end)?;
    if let Some(category_id) = input.info_category_id {
        ensure_info_category_exists(&state.pool, category_id).await?;
    }
    if let Some(category_id) = input.before.as_ref().and_then(|b| b.info_category_id_before) {
        ensure_info_category_exists(&state.pool, category_id).await?;
    }

    let proposal = ProposalRepo::create(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Article", &input.article_id))?;

    tracing::info!(
        user_id = auth.user_id,
        proposal_id = proposal.id,
        article_code = %proposal.article_id,
        approval_group_id = proposal.approval_group_id,
        "Proposal created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: proposal })))
}

/// GET /api/v1/proposals?status=
///
/// General users see their own proposals, supervisors their group's plus
/// their own, admins everything.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListProposalsParams>,
) -> AppResult<impl IntoResponse> {
    let filter = ProposalFilter::new(&auth.actor(), params.status);
    let proposals = ProposalRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/proposals/pending-approval
///
/// The review queue: pending proposals in the caller's group (all groups
/// for admins).
pub async fn list_pending(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let actor = auth.actor();
    policy::require(&actor, Action::ListPendingProposals, Resource::None)?;

    let proposals = ProposalRepo::list_pending(&state.pool, ReviewScope::for_actor(&actor)).await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/proposals/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let proposal = find_readable(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: proposal }))
}

/// GET /api/v1/proposals/{id}/before
///
/// The content snapshot recorded for the proposal.
pub async fn get_before(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_readable(&state, &auth, id).await?;

    let snapshot = ProposalBeforeRepo::find_by_proposal(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("ProposalBefore", id))?;
    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// PUT /api/v1/proposals/{id}
///
/// Creator-only partial edit of the content fields while the proposal is
/// still pending. An explicit `null` clears a nullable field.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProposal>,
) -> AppResult<impl IntoResponse> {
    require_non_empty_opt("title", input.title.as_deref())?;
    require_non_empty_opt("reason", input.reason.as_deref())?;
    if let Some(Some(category_id)) = input.info_category_id {
        ensure_info_category_exists(&state.pool, category_id).await?;
    }

    let mut tx = state.pool.begin().await?;

    let current = ProposalRepo::lock_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Proposal", id))?;

    policy::require(
        &auth.actor(),
        Action::UpdateProposal,
        Resource::Proposal(current.policy_ref()),
    )?;
    ensure_pending(current.status)?;
    validate_publish_window(
        input.published_start.unwrap_or(current.published_start),
        input.published_end.unwrap_or(current.published_end),
    )?;

    let proposal = ProposalRepo::update_content(&mut tx, id, &input)
        .await?
        .ok_or_else(not_pending)?;

    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, proposal_id = id, "Proposal updated");

    Ok(Json(DataResponse { data: proposal }))
}

/// POST /api/v1/proposals/{id}/approve
///
/// Approve or reject (`{"status": "approved" | "rejected", "rejection_reason"}`).
/// Guards run in order: target status, existence, still pending, reviewer
/// scope and self-approval, rejection reason. The snapshot is left as filed;
/// a proposal created without one stays without one.
pub async fn decide(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecideProposal>,
) -> AppResult<impl IntoResponse> {
    validate_decision_target(input.status)?;

    let mut tx = state.pool.begin().await?;

    let current = ProposalRepo::lock_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Proposal", id))?;

    ensure_pending(current.status)?;
    policy::require(
        &auth.actor(),
        Action::DecideProposal,
        Resource::Proposal(current.policy_ref()),
    )?;
    let decision = resolve_decision(input.status, input.rejection_reason.as_deref())?;
    check_rejection_invariant(decision.status, decision.rejection_reason.as_deref())?;

    let proposal = ProposalRepo::apply_decision(&mut tx, id, auth.user_id, &decision)
        .await?
        .ok_or_else(not_pending)?;

    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        proposal_id = id,
        status = %proposal.status,
        "Proposal decided"
    );

    Ok(Json(DataResponse { data: proposal }))
}

/// DELETE /api/v1/proposals/{id}
///
/// Creator or admin, in any status. The snapshot goes with it.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let proposal = ProposalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Proposal", id))?;

    policy::require(
        &auth.actor(),
        Action::DeleteProposal,
        Resource::Proposal(proposal.policy_ref()),
    )?;

    if !ProposalRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Proposal", id).into());
    }

    tracing::info!(user_id = auth.user_id, proposal_id = id, "Proposal deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a proposal the caller may read: 404 if missing, 403 if out of scope.
async fn find_readable(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Proposal> {
    let proposal = ProposalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Proposal", id))?;

    policy::require(
        &auth.actor(),
        Action::ReadProposal,
        Resource::Proposal(proposal.policy_ref()),
    )?;
    Ok(proposal)
}

/// The row was pending when locked but the conditional write matched
/// nothing.
fn not_pending() -> CoreError {
    CoreError::Conflict("Proposal is not pending approval".into())
}
