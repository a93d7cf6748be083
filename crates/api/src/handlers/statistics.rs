//! Handlers for the read-only `/statistics` reports.
//!
//! Per-user reports default to the caller; a general user may only ask about
//! themselves. Trend and approval statistics are limited to reviewers and
//! scoped to a supervisor's group.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use knowmaint_core::policy::{self, Action, Resource};
use knowmaint_core::statistics::{
    validate_month, ApprovalRate, ApprovalStatistics, MonthlyProposalCount, MonthlyTrend,
    ProposalSummary,
};
use knowmaint_core::types::DbId;
use knowmaint_core::visibility::ReviewScope;
use knowmaint_db::repositories::StatisticsRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MonthlyProposalsParams {
    pub year: i32,
    pub month: u32,
    pub user_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct YearParams {
    pub year: i32,
}

// ---------------------------------------------------------------------------
// Per-user reports
// ---------------------------------------------------------------------------

/// GET /api/v1/statistics/user/monthly-proposals?year&month[&user_id]
pub async fn user_monthly_proposals(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MonthlyProposalsParams>,
) -> AppResult<impl IntoResponse> {
    validate_month(params.month)?;
    let user_id = subject(&auth, params.user_id)?;

    // validate_month bounds the value to 1..=12.
    let count =
        StatisticsRepo::monthly_count(&state.pool, user_id, params.year, params.month as i32)
            .await?;

    Ok(Json(DataResponse {
        data: MonthlyProposalCount {
            user_id,
            year: params.year,
            month: params.month,
            count,
        },
    }))
}

/// GET /api/v1/statistics/user/approval-rate[?user_id]
pub async fn user_approval_rate(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = subject(&auth, params.user_id)?;

    let (total, approved) = StatisticsRepo::user_approval_counts(&state.pool, user_id).await?;

    Ok(Json(DataResponse {
        data: ApprovalRate::from_counts(user_id, total, approved),
    }))
}

/// GET /api/v1/statistics/user/proposal-summary[?user_id]
pub async fn user_proposal_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = subject(&auth, params.user_id)?;

    let by_status = StatisticsRepo::user_status_counts(&state.pool, user_id).await?;
    let by_type = StatisticsRepo::user_type_counts(&state.pool, user_id).await?;

    Ok(Json(DataResponse {
        data: ProposalSummary::from_groups(user_id, &by_status, &by_type),
    }))
}

// ---------------------------------------------------------------------------
// Reviewer reports
// ---------------------------------------------------------------------------

/// GET /api/v1/statistics/group/proposal-counts
///
/// Every group, including groups with no proposals. Admin only.
pub async fn group_proposal_counts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    policy::require(&auth.actor(), Action::ReadGroupBreakdown, Resource::None)?;

    let counts = StatisticsRepo::group_proposal_counts(&state.pool).await?;
    Ok(Json(DataResponse { data: counts }))
}

/// GET /api/v1/statistics/monthly-trends?year
pub async fn monthly_trends(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> AppResult<impl IntoResponse> {
    let scope = reviewer_scope(&auth)?;

    let rows = StatisticsRepo::monthly_counts_for_year(&state.pool, params.year, scope).await?;

    Ok(Json(DataResponse {
        data: MonthlyTrend::fill(params.year, &rows),
    }))
}

/// GET /api/v1/statistics/approval-statistics
pub async fn approval_statistics(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let scope = reviewer_scope(&auth)?;

    let (pending, approved, rejected) = StatisticsRepo::status_totals(&state.pool, scope).await?;

    Ok(Json(DataResponse {
        data: ApprovalStatistics::from_counts(pending, approved, rejected),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the subject of a per-user report and check the caller may see it.
fn subject(auth: &AuthUser, requested: Option<DbId>) -> AppResult<DbId> {
    let user_id = requested.unwrap_or(auth.user_id);
    policy::require(
        &auth.actor(),
        Action::ReadUserStatistics,
        Resource::User(user_id),
    )?;
    Ok(user_id)
}

fn reviewer_scope(auth: &AuthUser) -> AppResult<ReviewScope> {
    let actor = auth.actor();
    policy::require(&actor, Action::ReadScopedStatistics, Resource::None)?;
    Ok(ReviewScope::for_actor(&actor))
}
