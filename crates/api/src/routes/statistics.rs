//! Route definitions for the `/statistics` reports.

use axum::routing::get;
use axum::Router;

use crate::handlers::statistics;
use crate::state::AppState;

/// Routes mounted at `/statistics`.
///
/// ```text
/// GET /user/monthly-proposals   -> user_monthly_proposals (?year&month[&user_id])
/// GET /user/approval-rate       -> user_approval_rate ([?user_id])
/// GET /user/proposal-summary    -> user_proposal_summary ([?user_id])
/// GET /group/proposal-counts    -> group_proposal_counts (admin)
/// GET /monthly-trends           -> monthly_trends (?year, supervisor, admin)
/// GET /approval-statistics      -> approval_statistics (supervisor, admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/user/monthly-proposals",
            get(statistics::user_monthly_proposals),
        )
        .route("/user/approval-rate", get(statistics::user_approval_rate))
        .route(
            "/user/proposal-summary",
            get(statistics::user_proposal_summary),
        )
        .route(
            "/group/proposal-counts",
            get(statistics::group_proposal_counts),
        )
        .route("/monthly-trends", get(statistics::monthly_trends))
        .route(
            "/approval-statistics",
            get(statistics::approval_statistics),
        )
}
