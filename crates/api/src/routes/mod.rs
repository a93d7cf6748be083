pub mod articles;
pub mod auth;
pub mod groups;
pub mod health;
pub mod info_categories;
pub mod proposals;
pub mod statistics;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
/// /auth/refresh                                refresh (public)
/// /auth/logout                                 logout
///
/// /users                                       list, create (admin)
/// /users/me                                    current user
/// /users/{id}                                  get, update, delete (admin)
/// /users/{id}/reset-password                   reset password (admin)
///
/// /groups                                      list, create (admin)
/// /groups/{id}                                 get, update, delete (admin)
/// /info-categories                             list, create (admin)
/// /info-categories/{id}                        get, update, delete (admin)
/// /articles                                    list, create (admin)
/// /articles/{code}                             get, update, delete (admin)
///
/// /proposals                                   list (role scoped), create
/// /proposals/pending-approval                  review queue
/// /proposals/{id}                              get, update, delete
/// /proposals/{id}/approve                      approve or reject
/// /proposals/{id}/before                       content snapshot
///
/// /statistics/user/monthly-proposals           per-user monthly count
/// /statistics/user/approval-rate               per-user approval rate
/// /statistics/user/proposal-summary            per-user status/type counts
/// /statistics/group/proposal-counts            per-group counts (admin)
/// /statistics/monthly-trends                   twelve-month trend
/// /statistics/approval-statistics              status totals and rates
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication (login, refresh, logout).
        .nest("/auth", auth::router())
        // Account management.
        .nest("/users", users::router())
        // Catalog.
        .nest("/groups", groups::router())
        .nest("/info-categories", info_categories::router())
        .nest("/articles", articles::router())
        // Proposal workflow.
        .nest("/proposals", proposals::router())
        // Reports.
        .nest("/statistics", statistics::router())
}
