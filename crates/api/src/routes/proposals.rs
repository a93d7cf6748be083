//! Route definitions for the `/proposals` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::proposals;
use crate::state::AppState;

/// Routes mounted at `/proposals`.
///
/// ```text
/// GET    /                    -> list (?status=)
/// POST   /                    -> create
/// GET    /pending-approval    -> list_pending (supervisor, admin)
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update (creator)
/// DELETE /{id}                -> delete (creator, admin)
/// POST   /{id}/approve        -> decide (supervisor, admin)
/// GET    /{id}/before         -> get_before
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(proposals::list).post(proposals::create))
        .route("/pending-approval", get(proposals::list_pending))
        .route(
            "/{id}",
            get(proposals::get_by_id)
                .put(proposals::update)
                .delete(proposals::delete),
        )
        .route("/{id}/approve", post(proposals::decide))
        .route("/{id}/before", get(proposals::get_before))
}
